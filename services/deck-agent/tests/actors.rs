//! Integration tests for keyed routing, crash isolation and respawn.

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};

use common::{eventually, key_down, key_down_with, Harness, Seen};
use deck_agent::actors::InstanceState;
use deck_agent::Diagnostic;
use deck_events::{Event, EventKind};
use deck_id::InstanceKey;
use serde_json::json;

fn seqs(seen: &[Seen]) -> Vec<u32> {
    seen.iter().map(|s| s.seq).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_events_spawn_exactly_one_actor() {
    let harness = Harness::new();
    let runtime = tokio::runtime::Handle::current();
    let barrier = Arc::new(Barrier::new(8));

    let routers: Vec<_> = (0..8u32)
        .map(|t| {
            let supervisor = Arc::clone(&harness.supervisor);
            let barrier = Arc::clone(&barrier);
            let runtime = runtime.clone();
            std::thread::spawn(move || {
                let _guard = runtime.enter();
                barrier.wait();
                for i in 0..8u32 {
                    supervisor.route(key_down("shared", t * 8 + i));
                }
            })
        })
        .collect();
    for router in routers {
        router.join().unwrap();
    }

    eventually(|| harness.factory.journal_len() == 64).await;

    assert_eq!(harness.factory.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.supervisor.len(), 1);

    let seen = harness.factory.seen_by("shared");
    assert!(seen.iter().all(|s| s.incarnation == 0));
    let mut all = seqs(&seen);
    all.sort_unstable();
    assert_eq!(all, (0..64).collect::<Vec<_>>());

    // Per-thread order survives.
    for t in 0..8u32 {
        let from_thread: Vec<_> = seqs(&seen).into_iter().filter(|s| s / 8 == t).collect();
        assert_eq!(from_thread, (t * 8..t * 8 + 8).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_key_down_spawns_actor_that_replies_show_ok() {
    let mut harness = Harness::new();

    harness.supervisor.route(key_down("k1", 1));
    assert!(harness.supervisor.contains(&InstanceKey::new("k1")));

    let reply = harness.host.recv_json().await.unwrap();
    assert_eq!(reply, json!({"event": "showOk", "context": "k1"}));
    assert!(reply.get("payload").is_none());
}

#[tokio::test]
async fn test_same_key_events_arrive_in_routed_order() {
    let harness = Harness::new();

    for seq in 0..50 {
        harness.supervisor.route(key_down("k1", seq));
        if seq % 7 == 0 {
            tokio::task::yield_now().await;
        }
    }

    eventually(|| harness.factory.journal_len() == 50).await;
    assert_eq!(seqs(&harness.factory.seen_by("k1")), (0..50).collect::<Vec<_>>());
    assert_eq!(harness.factory.spawns_of("k1"), 1);
}

#[tokio::test]
async fn test_crash_terminates_actor_and_next_event_respawns() {
    let mut harness = Harness::new();
    let k1 = InstanceKey::new("k1");

    // All five are queued before the worker first runs.
    for seq in 1..=5 {
        let settings = if seq == 3 { json!({"panic": true}) } else { json!({}) };
        harness.supervisor.route(key_down_with("k1", seq, settings));
    }
    let first_generation = harness.supervisor.generation(&k1).unwrap();

    assert_eq!(harness.host.recv_json().await.unwrap()["event"], json!("showOk"));
    assert_eq!(harness.host.recv_json().await.unwrap()["event"], json!("showOk"));
    assert_eq!(
        harness.host.recv_json().await.unwrap(),
        json!({"event": "showAlert", "context": "k1"})
    );

    eventually(|| !harness.supervisor.contains(&k1)).await;
    assert_eq!(seqs(&harness.factory.seen_by("k1")), vec![1, 2, 3]);

    let crashes: Vec<_> = harness
        .diagnostics
        .snapshot()
        .into_iter()
        .filter(Diagnostic::is_crash)
        .collect();
    assert_eq!(crashes.len(), 1);
    match &crashes[0] {
        Diagnostic::HandlerCrashed { key, kind, reason } => {
            assert_eq!(key, &k1);
            assert_eq!(*kind, Some(EventKind::KeyDown));
            assert!(reason.contains("key 3 exploded"), "{reason}");
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }

    harness.supervisor.route(key_down("k1", 6));
    assert!(harness.supervisor.generation(&k1).unwrap() > first_generation);
    assert_eq!(harness.host.recv_json().await.unwrap()["event"], json!("showOk"));

    let seen = harness.factory.seen_by("k1");
    let respawned: Vec<_> = seen.iter().filter(|s| s.incarnation == 1).collect();
    assert_eq!(respawned.len(), 1);
    assert_eq!(respawned[0].seq, 6);
    assert_eq!(harness.factory.spawns_of("k1"), 2);
    // Exactly one alert: nothing else was written.
    assert!(harness.host.try_recv().is_none());
}

#[tokio::test]
async fn test_crash_does_not_disturb_other_actor() {
    let harness = Harness::new();
    let a = InstanceKey::new("a");
    let b = InstanceKey::new("b");

    harness.supervisor.route(key_down("b", 0));
    harness
        .supervisor
        .route(key_down_with("a", 0, json!({"panic": true})));
    for seq in 1..=5 {
        harness.supervisor.route(key_down("b", seq));
        tokio::task::yield_now().await;
    }

    eventually(|| harness.factory.seen_by("b").len() == 6).await;
    eventually(|| !harness.supervisor.contains(&a)).await;

    assert_eq!(seqs(&harness.factory.seen_by("b")), vec![0, 1, 2, 3, 4, 5]);
    assert!(harness.supervisor.contains(&b));
    assert_ne!(harness.supervisor.state(&b), Some(InstanceState::Terminated));
    assert_eq!(harness.factory.spawns_of("b"), 1);
}

#[tokio::test]
async fn test_fatal_error_terminates_but_failed_error_does_not() {
    let mut harness = Harness::new();
    let k1 = InstanceKey::new("k1");
    let k2 = InstanceKey::new("k2");

    harness
        .supervisor
        .route(key_down_with("k1", 1, json!({"fail": true})));
    harness.supervisor.route(key_down("k1", 2));
    harness
        .supervisor
        .route(key_down_with("k2", 1, json!({"fatal": true})));

    eventually(|| harness.factory.journal_len() == 3).await;
    eventually(|| !harness.supervisor.contains(&k2)).await;

    assert!(harness.supervisor.contains(&k1));
    assert_eq!(seqs(&harness.factory.seen_by("k1")), vec![1, 2]);

    let diagnostics = harness.diagnostics.snapshot();
    assert!(diagnostics.contains(&Diagnostic::HandlerError {
        key: k1.clone(),
        kind: Some(EventKind::KeyDown),
        error: "handler failed: try again".to_string(),
    }));
    assert!(diagnostics.contains(&Diagnostic::HandlerCrashed {
        key: k2.clone(),
        kind: Some(EventKind::KeyDown),
        reason: "fatal: cannot continue".to_string(),
    }));

    let mut written = Vec::new();
    for _ in 0..2 {
        written.push(harness.host.recv_json().await.unwrap());
    }
    assert!(written.contains(&json!({"event": "showOk", "context": "k1"})));
    assert!(written.contains(&json!({"event": "showAlert", "context": "k2"})));
}

#[tokio::test]
async fn test_broadcast_reaches_only_registered_actors() {
    let harness = Harness::new();

    harness.supervisor.route(key_down("k1", 1));
    harness.supervisor.route(key_down("k2", 1));
    harness.supervisor.route(Event::SystemDidWakeUp);
    harness.supervisor.route(key_down("k3", 1));

    eventually(|| harness.factory.journal_len() == 5).await;

    let woke = |key: &str| {
        harness
            .factory
            .seen_by(key)
            .iter()
            .filter(|s| s.kind == EventKind::SystemDidWakeUp)
            .count()
    };
    assert_eq!(woke("k1"), 1);
    assert_eq!(woke("k2"), 1);
    assert_eq!(woke("k3"), 0);
}
