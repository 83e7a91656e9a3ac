//! Actor worker loop.
//!
//! Each live actor is one tokio task draining its own mailbox. Producers
//! enqueue and then notify a single-permit [`Notify`]; many enqueues between
//! two wake-ups collapse into one wake, and `drain_all` picks up everything
//! queued so far, so nothing is lost.
//!
//! A handler panic or a fatal handler error ends the actor. The order of
//! side effects is fixed: record the failure, send `showAlert` for the key,
//! then remove the key from the registry if it still maps to this actor.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use deck_events::{Event, EventKind};
use deck_id::InstanceKey;
use futures_util::FutureExt;
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, trace, warn};

use super::instance::{deliver, HandlerResult, Instance, InstanceContext};
use super::mailbox::Mailbox;
use super::supervisor::Registry;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::outlet::Outlet;

// =============================================================================
// State
// =============================================================================

/// Lifecycle of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InstanceState {
    /// Running `on_start`.
    Starting = 0,
    /// Waiting for a wake signal.
    Idle = 1,
    /// Handling a drained batch.
    Draining = 2,
    /// Stopped by shutdown.
    Stopped = 3,
    /// Ended by a crash. Absorbing.
    Terminated = 4,
}

impl InstanceState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Starting,
            1 => Self::Idle,
            2 => Self::Draining,
            3 => Self::Stopped,
            _ => Self::Terminated,
        }
    }
}

/// State shared between the handle and the worker task.
struct Slot {
    mailbox: Mailbox<Event>,
    wake: Notify,
    state: AtomicU8,
}

impl Slot {
    fn set_state(&self, state: InstanceState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Registry entry for a live actor.
#[derive(Clone)]
pub(crate) struct InstanceHandle {
    slot: Arc<Slot>,
    generation: u64,
}

impl InstanceHandle {
    /// Enqueues an event and wakes the worker.
    pub(crate) fn deliver(&self, event: Event) {
        self.slot.mailbox.enqueue(event);
        self.slot.wake.notify_one();
    }

    /// Identifies this actor among all actors ever spawned for the key.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn state(&self) -> InstanceState {
        InstanceState::from_u8(self.slot.state.load(Ordering::Acquire))
    }

    pub(crate) fn pending(&self) -> usize {
        self.slot.mailbox.len()
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Everything a worker needs besides the user's handler.
pub(crate) struct WorkerDeps {
    pub registry: Arc<Registry>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub outlet: Outlet,
    pub shutdown: watch::Receiver<bool>,
}

pub(crate) struct Worker {
    key: InstanceKey,
    generation: u64,
    instance: Box<dyn Instance>,
    slot: Arc<Slot>,
    ctx: InstanceContext,
    registry: Arc<Registry>,
    diagnostics: Arc<dyn DiagnosticSink>,
    shutdown: watch::Receiver<bool>,
}

/// Builds a worker and its handle. The caller spawns [`Worker::run`].
pub(crate) fn new_worker(
    key: InstanceKey,
    generation: u64,
    instance: Box<dyn Instance>,
    deps: WorkerDeps,
) -> (InstanceHandle, Worker) {
    let slot = Arc::new(Slot {
        mailbox: Mailbox::new(),
        wake: Notify::new(),
        state: AtomicU8::new(InstanceState::Starting as u8),
    });
    let handle = InstanceHandle {
        slot: Arc::clone(&slot),
        generation,
    };
    let ctx = InstanceContext::new(key.clone(), deps.outlet, deps.shutdown.clone());
    let worker = Worker {
        key,
        generation,
        instance,
        slot,
        ctx,
        registry: deps.registry,
        diagnostics: deps.diagnostics,
        shutdown: deps.shutdown,
    };
    (handle, worker)
}

impl Worker {
    /// Runs until shutdown or until a handler crashes.
    pub(crate) async fn run(mut self) {
        debug!(
            instance_key = %self.key,
            generation = self.generation,
            name = self.instance.name(),
            "Instance started"
        );

        let started = AssertUnwindSafe(self.instance.on_start(&self.ctx))
            .catch_unwind()
            .await;
        if let Some(reason) = self.check(None, started) {
            return self.terminate(None, reason).await;
        }

        'run: loop {
            if *self.shutdown.borrow() {
                break;
            }
            self.slot.set_state(InstanceState::Idle);

            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    // A dropped sender can never signal again.
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                    continue;
                }

                _ = self.slot.wake.notified() => {}
            }

            let batch = self.slot.mailbox.drain_all();
            if batch.is_empty() {
                continue;
            }
            self.slot.set_state(InstanceState::Draining);
            trace!(instance_key = %self.key, batch = batch.len(), "Draining mailbox");

            for event in batch {
                if self.ctx.is_shutdown() {
                    break 'run;
                }
                let kind = event.kind();
                let outcome = AssertUnwindSafe(deliver(self.instance.as_mut(), &self.ctx, event))
                    .catch_unwind()
                    .await;
                self.ctx.events_handled += 1;
                self.ctx.last_event_at = Some(Instant::now());

                if let Some(reason) = self.check(Some(kind), outcome) {
                    return self.terminate(Some(kind), reason).await;
                }
            }
        }

        self.instance.on_stop(&self.ctx).await;
        self.slot.set_state(InstanceState::Stopped);
        info!(
            instance_key = %self.key,
            events_handled = self.ctx.events_handled,
            "Instance stopped"
        );
    }

    /// Classifies a handler outcome. Returns the crash reason if the actor
    /// must terminate; non-fatal errors are reported here.
    fn check(
        &self,
        kind: Option<EventKind>,
        outcome: std::thread::Result<HandlerResult>,
    ) -> Option<String> {
        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) if e.is_fatal() => Some(e.to_string()),
            Ok(Err(e)) => {
                warn!(
                    instance_key = %self.key,
                    event_kind = kind.map(EventKind::as_str).unwrap_or("start"),
                    error = %e,
                    "Handler failed"
                );
                self.diagnostics.report(Diagnostic::HandlerError {
                    key: self.key.clone(),
                    kind,
                    error: e.to_string(),
                });
                None
            }
            Err(panic) => Some(format!("panicked: {}", panic_message(panic.as_ref()))),
        }
    }

    async fn terminate(self, kind: Option<EventKind>, reason: String) {
        self.slot.set_state(InstanceState::Terminated);

        error!(
            instance_key = %self.key,
            generation = self.generation,
            event_kind = kind.map(EventKind::as_str).unwrap_or("start"),
            reason = %reason,
            "Instance crashed, terminating"
        );
        self.diagnostics.report(Diagnostic::HandlerCrashed {
            key: self.key.clone(),
            kind,
            reason,
        });

        if let Err(e) = self.ctx.outlet().show_alert(self.key.clone()).await {
            warn!(instance_key = %self.key, error = %e, "Failed to send alert");
        }

        let removed = self.registry.remove_if_current(&self.key, self.generation);
        let discarded = self.slot.mailbox.drain_all().len();
        debug!(
            instance_key = %self.key,
            removed,
            discarded,
            "Instance deregistered"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extracts_payload() {
        let err = std::panic::catch_unwind(|| panic!("boom {}", 3)).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "boom 3");

        let err = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "static");

        let err = std::panic::catch_unwind(|| std::panic::panic_any(7u32)).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_state_roundtrip() {
        for state in [
            InstanceState::Starting,
            InstanceState::Idle,
            InstanceState::Draining,
            InstanceState::Stopped,
            InstanceState::Terminated,
        ] {
            assert_eq!(InstanceState::from_u8(state as u8), state);
        }
    }
}
