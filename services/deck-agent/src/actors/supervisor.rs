//! Keyed supervisor - owns the registry of live actors.
//!
//! Routing rules:
//! - a targeted event goes to the actor registered for its key; on a miss
//!   the factory is asked for a new actor while the registry lock is held,
//!   so concurrent events for an unseen key spawn exactly one actor
//! - a broadcast event goes to every actor registered when it is routed;
//!   actors spawned later do not see it
//! - routing never fails: events that cannot be delivered are reported to
//!   the diagnostic sink and dropped
//!
//! The registry lock is held for lookup, insert, remove and snapshot only.
//! Handlers always run on the actor's own task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use deck_events::{Event, Routing};
use deck_id::InstanceKey;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use super::instance::InstanceFactory;
use super::worker::{new_worker, InstanceHandle, InstanceState, WorkerDeps};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::outlet::Outlet;

// =============================================================================
// Registry
// =============================================================================

/// Live actors by key.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<HashMap<InstanceKey, InstanceHandle>>,
}

impl Registry {
    /// Removes `key` only if it still maps to the actor of `generation`.
    pub(crate) fn remove_if_current(&self, key: &InstanceKey, generation: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(handle) if handle.generation() == generation => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    fn snapshot(&self) -> Vec<InstanceHandle> {
        self.entries.lock().values().cloned().collect()
    }
}

// =============================================================================
// Supervisor
// =============================================================================

/// Routes events to per-key actors, spawning them on demand.
pub struct Supervisor {
    registry: Arc<Registry>,
    factory: Box<dyn InstanceFactory>,
    diagnostics: Arc<dyn DiagnosticSink>,
    outlet: Outlet,
    shutdown: watch::Receiver<bool>,
    next_generation: AtomicU64,
    workers: Mutex<JoinSet<()>>,
}

impl Supervisor {
    /// Create a new supervisor with an empty registry.
    pub fn new(
        factory: impl InstanceFactory,
        diagnostics: Arc<dyn DiagnosticSink>,
        outlet: Outlet,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            registry: Arc::new(Registry::default()),
            factory: Box::new(factory),
            diagnostics,
            outlet,
            shutdown,
            next_generation: AtomicU64::new(1),
            workers: Mutex::new(JoinSet::new()),
        }
    }

    /// Delivers one event. Must be called from within a tokio runtime.
    pub fn route(&self, event: Event) {
        let key = match event.routing() {
            Routing::Broadcast => return self.broadcast(event),
            Routing::Targeted(key) if key.is_empty() => {
                let kind = event.kind();
                debug!(event_kind = %kind, "Targeted event without instance key");
                self.diagnostics.report(Diagnostic::UnroutedEvent { kind });
                return;
            }
            Routing::Targeted(key) => key.clone(),
        };
        self.route_targeted(key, event);
    }

    fn route_targeted(&self, key: InstanceKey, event: Event) {
        let kind = event.kind();
        let mut entries = self.registry.entries.lock();

        if let Some(handle) = entries.get(&key) {
            trace!(instance_key = %key, event_kind = %kind, "Routing to live instance");
            handle.deliver(event);
            return;
        }

        let Some(instance) = self.factory.create(&key) else {
            drop(entries);
            debug!(instance_key = %key, event_kind = %kind, "Factory declined instance");
            self.diagnostics
                .report(Diagnostic::SpawnRefused { key, kind });
            return;
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (handle, worker) = new_worker(key.clone(), generation, instance, self.worker_deps());
        handle.deliver(event);
        entries.insert(key.clone(), handle);

        {
            let mut workers = self.workers.lock();
            reap_finished(&mut workers);
            workers.spawn(worker.run());
        }
        drop(entries);

        info!(instance_key = %key, generation, event_kind = %kind, "Spawned instance");
    }

    fn broadcast(&self, event: Event) {
        let targets = self.registry.snapshot();
        trace!(event_kind = %event.kind(), targets = targets.len(), "Broadcasting event");
        for handle in &targets {
            handle.deliver(event.clone());
        }
    }

    fn worker_deps(&self) -> WorkerDeps {
        WorkerDeps {
            registry: Arc::clone(&self.registry),
            diagnostics: Arc::clone(&self.diagnostics),
            outlet: self.outlet.clone(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Number of live actors.
    pub fn len(&self) -> usize {
        self.registry.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.entries.lock().is_empty()
    }

    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.registry.entries.lock().contains_key(key)
    }

    /// Keys of all live actors, in no particular order.
    pub fn keys(&self) -> Vec<InstanceKey> {
        self.registry.entries.lock().keys().cloned().collect()
    }

    /// Lifecycle state of the actor registered for `key`.
    pub fn state(&self, key: &InstanceKey) -> Option<InstanceState> {
        self.registry.entries.lock().get(key).map(InstanceHandle::state)
    }

    /// Generation of the actor registered for `key`. A respawned key gets a
    /// higher generation than any actor before it.
    pub fn generation(&self, key: &InstanceKey) -> Option<u64> {
        self.registry
            .entries
            .lock()
            .get(key)
            .map(InstanceHandle::generation)
    }

    /// Events queued for `key` and not yet drained.
    pub fn pending(&self, key: &InstanceKey) -> Option<usize> {
        self.registry.entries.lock().get(key).map(InstanceHandle::pending)
    }

    /// Waits for every worker task to finish after shutdown has been
    /// signaled, aborting the ones still running after `grace`.
    pub async fn join_all(&self, grace: Duration) {
        let mut workers = std::mem::take(&mut *self.workers.lock());
        info!(count = workers.len(), "Waiting for instances to stop");

        let drained = tokio::time::timeout(grace, async {
            while let Some(result) = workers.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "Instance task failed");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(remaining = workers.len(), "Force aborting instances");
            workers.abort_all();
        }
    }
}

/// Collects finished worker tasks without waiting. Returns how many of them
/// ended in a panic or were cancelled.
fn reap_finished(workers: &mut JoinSet<()>) -> usize {
    let mut failed = 0;
    while let Some(result) = workers.try_join_next() {
        if let Err(e) = result {
            warn!(error = %e, "Instance task failed");
            failed += 1;
        }
    }
    failed
}

// =============================================================================
// Tests
// =============================================================================
