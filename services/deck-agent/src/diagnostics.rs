//! Non-fatal problems surfaced to the operator.
//!
//! Nothing reported here stops dispatch. Sinks must not block: they are
//! called from the dispatch loop and from actor workers.

use std::fmt;

use deck_events::EventKind;
use deck_id::InstanceKey;
use parking_lot::Mutex;
use tracing::{error, warn};

use crate::outlet::Outlet;

/// A reportable runtime problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The message named an event kind outside the vocabulary.
    UnknownEvent { kind: String },

    /// The message could not be decoded into an event.
    UndecodableEvent { reason: String },

    /// A targeted event arrived without an instance key.
    UnroutedEvent { kind: EventKind },

    /// The factory declined to create an actor for a key.
    SpawnRefused { key: InstanceKey, kind: EventKind },

    /// A handler returned a non-fatal error.
    HandlerError {
        key: InstanceKey,
        kind: Option<EventKind>,
        error: String,
    },

    /// A handler panicked or failed fatally; the actor was terminated.
    HandlerCrashed {
        key: InstanceKey,
        kind: Option<EventKind>,
        reason: String,
    },
}

impl Diagnostic {
    /// True for diagnostics that terminated an actor.
    pub fn is_crash(&self) -> bool {
        matches!(self, Diagnostic::HandlerCrashed { .. })
    }

    /// The instance key this diagnostic is about, if any.
    pub fn instance_key(&self) -> Option<&InstanceKey> {
        match self {
            Diagnostic::SpawnRefused { key, .. }
            | Diagnostic::HandlerError { key, .. }
            | Diagnostic::HandlerCrashed { key, .. } => Some(key),
            _ => None,
        }
    }
}

fn stage(kind: &Option<EventKind>) -> &'static str {
    match kind {
        Some(kind) => kind.as_str(),
        None => "start",
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownEvent { kind } => write!(f, "unknown event kind {kind:?}"),
            Diagnostic::UndecodableEvent { reason } => write!(f, "undecodable event: {reason}"),
            Diagnostic::UnroutedEvent { kind } => {
                write!(f, "{kind} event has no instance key; dropped")
            }
            Diagnostic::SpawnRefused { key, kind } => {
                write!(f, "no instance created for {key}; {kind} event dropped")
            }
            Diagnostic::HandlerError { key, kind, error } => {
                write!(f, "instance {key} failed on {}: {error}", stage(kind))
            }
            Diagnostic::HandlerCrashed { key, kind, reason } => {
                write!(f, "instance {key} crashed on {}: {reason}", stage(kind))
            }
        }
    }
}

/// Receives diagnostics.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn report(&self, diagnostic: Diagnostic);
}

// =============================================================================
// Sinks
// =============================================================================

/// Writes diagnostics to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if diagnostic.is_crash() {
            error!(diagnostic = %diagnostic, "Instance crashed");
        } else {
            warn!(diagnostic = %diagnostic, "Runtime diagnostic");
        }
    }
}

/// Writes diagnostics to tracing and, best effort, to the host's plugin log.
#[derive(Debug, Clone)]
pub struct ForwardingDiagnostics {
    outlet: Outlet,
}

impl ForwardingDiagnostics {
    pub fn new(outlet: Outlet) -> Self {
        Self { outlet }
    }
}

impl DiagnosticSink for ForwardingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        TracingDiagnostics.report(diagnostic.clone());

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let outlet = self.outlet.clone();
        runtime.spawn(async move {
            if let Err(e) = outlet.log(format!("deck: {diagnostic}")).await {
                warn!(error = %e, "Failed to forward diagnostic");
            }
        });
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.seen.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.seen.lock().push(diagnostic);
    }
}

// =============================================================================
// Tests
// =============================================================================
