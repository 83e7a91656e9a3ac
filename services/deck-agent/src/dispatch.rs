//! Dispatch loop: reads raw messages, decodes them and routes the events.
//!
//! The loop is strictly sequential. It is the only reader of the inbound
//! channel and suspends only while waiting for the next message, so a slow
//! host stream is the single point of backpressure. Actors never block it.

use std::sync::Arc;

use deck_events::{decode, DecodeError};
use tokio::sync::watch;
use tracing::{error, info, trace, warn};

use crate::actors::Supervisor;
use crate::channel::Inbound;
use crate::config::DecodePolicy;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::DispatchError;

/// Run the dispatch loop until shutdown or until the host closes the channel.
///
/// Returns `Ok(())` on shutdown (dropping the shutdown sender counts as
/// shutdown) and [`DispatchError::ChannelClosed`] at end of stream. Transport
/// read errors are logged and the loop keeps reading.
pub async fn run_dispatch_loop<I: Inbound>(
    mut inbound: I,
    supervisor: Arc<Supervisor>,
    diagnostics: Arc<dyn DiagnosticSink>,
    policy: DecodePolicy,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), DispatchError> {
    info!(policy = ?policy, "Starting dispatch loop");

    let mut consecutive_failures = 0u32;

    loop {
        if *shutdown.borrow() {
            info!("Dispatch loop shutting down");
            return Ok(());
        }

        let next = tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Dispatch loop shutting down");
                    return Ok(());
                }
                continue;
            }

            next = inbound.next_message() => next,
        };

        let raw = match next {
            Ok(Some(raw)) => {
                consecutive_failures = 0;
                raw
            }
            Ok(None) => {
                info!("Host closed the channel");
                return Err(DispatchError::ChannelClosed);
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= 3 {
                    warn!(error = %e, consecutive_failures, "Failed to receive message");
                } else {
                    error!(error = %e, consecutive_failures, "Failed to receive message repeatedly");
                }
                continue;
            }
        };

        dispatch_one(&raw, &supervisor, diagnostics.as_ref(), policy)?;
    }
}

/// Decodes and routes one raw message.
pub fn dispatch_one(
    raw: &str,
    supervisor: &Supervisor,
    diagnostics: &dyn DiagnosticSink,
    policy: DecodePolicy,
) -> Result<(), DispatchError> {
    match decode(raw) {
        Ok(event) => {
            trace!(event_kind = %event.kind(), "Dispatching event");
            supervisor.route(event);
            Ok(())
        }
        Err(e) => {
            let diagnostic = match &e {
                DecodeError::UnknownEventKind(kind) => Diagnostic::UnknownEvent { kind: kind.clone() },
                other => Diagnostic::UndecodableEvent {
                    reason: other.to_string(),
                },
            };
            diagnostics.report(diagnostic);

            match policy {
                DecodePolicy::Skip => Ok(()),
                DecodePolicy::Abort => {
                    error!(error = %e, "Aborting dispatch on undecodable message");
                    Err(DispatchError::Decode(e))
                }
            }
        }
    }
}
