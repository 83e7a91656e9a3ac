//! deck-helloworld
//!
//! Sample plugin: pressing a key shows the current time as its title,
//! releasing it restores the user's title.
//!
//! Launched by the host with `-port`, `-pluginUUID`, `-registerEvent` and
//! `-info`. Runtime behavior is tuned through `DECK_*` variables.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use deck_agent::actors::{HandlerResult, Instance, InstanceContext};
use deck_agent::channel::websocket;
use deck_agent::diagnostics::{DiagnosticSink, ForwardingDiagnostics};
use deck_agent::{logging, run_dispatch_loop, Outlet, PluginArgs, RuntimeConfig, Supervisor};
use deck_events::KeyEvent;
use deck_id::InstanceKey;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// One key showing a clock while pressed.
#[derive(Debug, Default)]
struct Clock {
    presses: u64,
}

#[async_trait]
impl Instance for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    async fn on_key_down(&mut self, ctx: &InstanceContext, _ev: KeyEvent) -> HandlerResult {
        self.presses += 1;
        ctx.log(format!("key down ({})", self.presses)).await?;
        let now = chrono::Local::now().format("%H:%M:%S").to_string();
        ctx.set_title(now).await?;
        ctx.show_ok().await?;
        Ok(())
    }

    async fn on_key_up(&mut self, ctx: &InstanceContext, _ev: KeyEvent) -> HandlerResult {
        ctx.log("key up").await?;
        ctx.set_title("").await?;
        Ok(())
    }
}

fn clock(_key: &InstanceKey) -> Option<Box<dyn Instance>> {
    Some(Box::new(Clock::default()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = RuntimeConfig::from_env()?;
    logging::init(&runtime)?;

    let args = PluginArgs::from_env_args().unwrap_or_else(|e| e.exit());
    let registration = args.into_registration()?;
    info!(
        port = registration.port,
        plugin_uuid = %registration.plugin_uuid,
        host_version = registration.info.application_version().unwrap_or("unknown"),
        "Starting deck-helloworld"
    );

    let (inbound, outbound) = websocket::connect(&registration).await?;
    let outlet = Outlet::new(Arc::new(outbound), registration.plugin_uuid.clone());
    let diagnostics: Arc<dyn DiagnosticSink> = Arc::new(ForwardingDiagnostics::new(outlet.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let supervisor = Arc::new(Supervisor::new(
        clock,
        Arc::clone(&diagnostics),
        outlet.clone(),
        shutdown_rx.clone(),
    ));

    if let Err(e) = outlet.log("start").await {
        warn!(error = %e, "Failed to write start log");
    }

    let dispatch = tokio::spawn(run_dispatch_loop(
        inbound,
        Arc::clone(&supervisor),
        diagnostics,
        runtime.decode_policy,
        shutdown_rx,
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = dispatch => {
            match result {
                Ok(Ok(())) => info!("Dispatch loop exited normally"),
                Ok(Err(e)) if e.is_channel_closed() => info!("Host disconnected"),
                Ok(Err(e)) => error!(error = %e, "Dispatch loop error"),
                Err(e) => error!(error = %e, "Dispatch task panicked"),
            }
        }
    }

    let _ = shutdown_tx.send(true);
    supervisor.join_all(Duration::from_secs(2)).await;

    info!("deck-helloworld shutdown complete");
    Ok(())
}
