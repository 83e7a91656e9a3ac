//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deck_agent::actors::{HandlerResult, Instance, InstanceContext, InstanceError};
use deck_agent::channel::memory::{self, HostEnd, MemoryInbound};
use deck_agent::diagnostics::{CollectingDiagnostics, DiagnosticSink};
use deck_agent::{Outlet, Supervisor};
use deck_events::{Event, EventKind, KeyEvent};
use deck_id::{InstanceKey, PluginUuid};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::watch;

/// One event as observed by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub key: String,
    /// Which actor for this key saw it: 0 for the first spawn, 1 for the
    /// respawn after a crash, and so on.
    pub incarnation: usize,
    pub kind: EventKind,
    pub seq: u32,
}

pub type Journal = Arc<Mutex<Vec<Seen>>>;

/// Test actor driven by the settings of the key events it receives:
/// `{"panic": true}` panics, `{"fatal": true}` fails fatally and
/// `{"fail": true}` fails without terminating. Every other key down is
/// answered with `showOk`.
pub struct Recorder {
    incarnation: usize,
    journal: Journal,
}

impl Recorder {
    fn record(&self, ctx: &InstanceContext, kind: EventKind, seq: u32) {
        self.journal.lock().push(Seen {
            key: ctx.key().to_string(),
            incarnation: self.incarnation,
            kind,
            seq,
        });
    }
}

#[async_trait]
impl Instance for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn on_key_down(&mut self, ctx: &InstanceContext, ev: KeyEvent) -> HandlerResult {
        self.record(ctx, EventKind::KeyDown, ev.state);

        if ev.settings.get("panic") == Some(&Value::Bool(true)) {
            panic!("key {} exploded", ev.state);
        }
        if ev.settings.get("fatal") == Some(&Value::Bool(true)) {
            return Err(InstanceError::fatal("cannot continue"));
        }
        if ev.settings.get("fail") == Some(&Value::Bool(true)) {
            return Err(InstanceError::failed("try again"));
        }
        ctx.show_ok().await?;
        Ok(())
    }

    async fn on_system_did_wake_up(&mut self, ctx: &InstanceContext) -> HandlerResult {
        self.record(ctx, EventKind::SystemDidWakeUp, 0);
        Ok(())
    }
}

/// Factory producing [`Recorder`]s and counting calls per key.
#[derive(Clone, Default)]
pub struct RecorderFactory {
    pub journal: Journal,
    pub spawns: Arc<Mutex<Vec<String>>>,
    pub calls: Arc<AtomicUsize>,
}

impl RecorderFactory {
    pub fn spawns_of(&self, key: &str) -> usize {
        self.spawns.lock().iter().filter(|k| *k == key).count()
    }

    pub fn seen_by(&self, key: &str) -> Vec<Seen> {
        self.journal
            .lock()
            .iter()
            .filter(|s| s.key == key)
            .cloned()
            .collect()
    }

    pub fn journal_len(&self) -> usize {
        self.journal.lock().len()
    }
}

impl deck_agent::InstanceFactory for RecorderFactory {
    fn create(&self, key: &InstanceKey) -> Option<Box<dyn Instance>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let incarnation = self.spawns_of(key.as_str());
        self.spawns.lock().push(key.to_string());
        Some(Box::new(Recorder {
            incarnation,
            journal: Arc::clone(&self.journal),
        }))
    }
}

/// A supervisor wired to an in-memory host.
pub struct Harness {
    pub supervisor: Arc<Supervisor>,
    pub factory: RecorderFactory,
    pub diagnostics: Arc<CollectingDiagnostics>,
    pub host: HostEnd,
    pub inbound: Option<MemoryInbound>,
    pub shutdown: watch::Sender<bool>,
}

impl Harness {
    pub fn new() -> Self {
        let (inbound, outbound, host) = memory::pair();
        let outlet = Outlet::new(Arc::new(outbound), PluginUuid::new("plugin-uuid"));
        let factory = RecorderFactory::default();
        let diagnostics = Arc::new(CollectingDiagnostics::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let supervisor = Arc::new(Supervisor::new(
            factory.clone(),
            Arc::clone(&diagnostics) as Arc<dyn DiagnosticSink>,
            outlet,
            shutdown_rx,
        ));

        Self {
            supervisor,
            factory,
            diagnostics,
            host,
            inbound: Some(inbound),
            shutdown,
        }
    }

    pub fn diagnostics_sink(&self) -> Arc<dyn DiagnosticSink> {
        Arc::clone(&self.diagnostics) as Arc<dyn DiagnosticSink>
    }

    pub fn take_inbound(&mut self) -> MemoryInbound {
        self.inbound.take().expect("inbound already taken")
    }
}

/// A key down for `key` carrying `seq` in its state field.
pub fn key_down(key: &str, seq: u32) -> Event {
    key_down_with(key, seq, json!({}))
}

pub fn key_down_with(key: &str, seq: u32, settings: Value) -> Event {
    Event::KeyDown(KeyEvent {
        context: InstanceKey::new(key),
        state: seq,
        settings,
        ..Default::default()
    })
}

/// Polls `cond` until it holds, failing the test after five seconds.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}
