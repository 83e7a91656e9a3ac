//! Handler API for per-instance actors.
//!
//! A plugin implements [`Instance`] once per kind of key it manages. The
//! supervisor asks an [`InstanceFactory`] for a fresh value the first time a
//! key is seen, then feeds that value every event for the key, one at a
//! time, in routed order.
//!
//! Handlers signal failure through [`InstanceError`]:
//! - `Failed` / `Internal` / `Outlet`: reported, the actor keeps running
//! - `Fatal`: the actor is terminated, as if the handler had panicked

use std::time::Instant;

use async_trait::async_trait;
use deck_events::{
    AppearanceEvent, ApplicationEvent, DeviceDidConnect, DeviceDidDisconnect,
    DidReceiveGlobalSettings, DidReceiveSettings, Event, Image, KeyEvent, PropertyInspectorEvent,
    SendToPlugin, Target, TitleParametersDidChange,
};
use deck_id::InstanceKey;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

use crate::outlet::{Outlet, OutletError};

// =============================================================================
// Errors
// =============================================================================

/// Errors returned by instance handlers.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// The handler could not complete; the actor continues.
    #[error("handler failed: {0}")]
    Failed(String),

    /// The actor cannot continue and must be terminated.
    #[error("fatal: {0}")]
    Fatal(String),

    /// A command could not be written.
    #[error(transparent)]
    Outlet(#[from] OutletError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl InstanceError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// Whether this error terminates the actor.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

pub type HandlerResult = Result<(), InstanceError>;

// =============================================================================
// Context
// =============================================================================

/// Per-actor context handed to every handler.
pub struct InstanceContext {
    key: InstanceKey,
    outlet: Outlet,
    shutdown: watch::Receiver<bool>,

    /// Events processed so far, including ones whose handler failed.
    pub events_handled: u64,

    /// When the last event was processed.
    pub last_event_at: Option<Instant>,
}

impl InstanceContext {
    pub fn new(key: InstanceKey, outlet: Outlet, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            key,
            outlet,
            shutdown,
            events_handled: 0,
            last_event_at: None,
        }
    }

    /// The key this actor owns.
    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    pub fn outlet(&self) -> &Outlet {
        &self.outlet
    }

    /// Check if shutdown has been signaled.
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub async fn show_ok(&self) -> Result<(), OutletError> {
        self.outlet.show_ok(self.key.clone()).await
    }

    pub async fn show_alert(&self) -> Result<(), OutletError> {
        self.outlet.show_alert(self.key.clone()).await
    }

    /// Sets the title on both hardware and software for state 0.
    pub async fn set_title(&self, title: impl Into<String>) -> Result<(), OutletError> {
        self.outlet
            .set_title(self.key.clone(), title, Target::Both, 0)
            .await
    }

    /// Sets the image on both hardware and software for state 0.
    pub async fn set_image(&self, image: Option<Image>) -> Result<(), OutletError> {
        self.outlet
            .set_image(self.key.clone(), image, Target::Both, 0)
            .await
    }

    pub async fn set_state(&self, state: u32) -> Result<(), OutletError> {
        self.outlet.set_state(self.key.clone(), state).await
    }

    pub async fn set_settings(&self, settings: Value) -> Result<(), OutletError> {
        self.outlet.set_settings(self.key.clone(), settings).await
    }

    pub async fn get_settings(&self) -> Result<(), OutletError> {
        self.outlet.get_settings(self.key.clone()).await
    }

    pub async fn log(&self, message: impl Into<String>) -> Result<(), OutletError> {
        self.outlet.log(message).await
    }
}

// =============================================================================
// Instance Trait
// =============================================================================

/// Behavior of one actor.
///
/// Every handler defaults to doing nothing. Handlers run one at a time and
/// own `self` exclusively, so per-key state needs no locking.
#[async_trait]
#[allow(unused_variables)]
pub trait Instance: Send + 'static {
    /// Name for logging.
    fn name(&self) -> &str {
        "instance"
    }

    /// Called once before the first event is handled.
    async fn on_start(&mut self, ctx: &InstanceContext) -> HandlerResult {
        Ok(())
    }

    /// Called when the runtime shuts down. Not called after a crash.
    async fn on_stop(&mut self, ctx: &InstanceContext) {}

    async fn on_did_receive_settings(
        &mut self,
        ctx: &InstanceContext,
        ev: DidReceiveSettings,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_did_receive_global_settings(
        &mut self,
        ctx: &InstanceContext,
        ev: DidReceiveGlobalSettings,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_key_down(&mut self, ctx: &InstanceContext, ev: KeyEvent) -> HandlerResult {
        Ok(())
    }

    async fn on_key_up(&mut self, ctx: &InstanceContext, ev: KeyEvent) -> HandlerResult {
        Ok(())
    }

    async fn on_will_appear(&mut self, ctx: &InstanceContext, ev: AppearanceEvent) -> HandlerResult {
        Ok(())
    }

    async fn on_will_disappear(
        &mut self,
        ctx: &InstanceContext,
        ev: AppearanceEvent,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_title_parameters_did_change(
        &mut self,
        ctx: &InstanceContext,
        ev: TitleParametersDidChange,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_device_did_connect(
        &mut self,
        ctx: &InstanceContext,
        ev: DeviceDidConnect,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_device_did_disconnect(
        &mut self,
        ctx: &InstanceContext,
        ev: DeviceDidDisconnect,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_application_did_launch(
        &mut self,
        ctx: &InstanceContext,
        ev: ApplicationEvent,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_application_did_terminate(
        &mut self,
        ctx: &InstanceContext,
        ev: ApplicationEvent,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_system_did_wake_up(&mut self, ctx: &InstanceContext) -> HandlerResult {
        Ok(())
    }

    async fn on_property_inspector_did_appear(
        &mut self,
        ctx: &InstanceContext,
        ev: PropertyInspectorEvent,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_property_inspector_did_disappear(
        &mut self,
        ctx: &InstanceContext,
        ev: PropertyInspectorEvent,
    ) -> HandlerResult {
        Ok(())
    }

    async fn on_send_to_plugin(&mut self, ctx: &InstanceContext, ev: SendToPlugin) -> HandlerResult {
        Ok(())
    }
}

/// Invokes the handler matching the event variant.
pub async fn deliver(instance: &mut dyn Instance, ctx: &InstanceContext, event: Event) -> HandlerResult {
    match event {
        Event::DidReceiveSettings(ev) => instance.on_did_receive_settings(ctx, ev).await,
        Event::DidReceiveGlobalSettings(ev) => {
            instance.on_did_receive_global_settings(ctx, ev).await
        }
        Event::KeyDown(ev) => instance.on_key_down(ctx, ev).await,
        Event::KeyUp(ev) => instance.on_key_up(ctx, ev).await,
        Event::WillAppear(ev) => instance.on_will_appear(ctx, ev).await,
        Event::WillDisappear(ev) => instance.on_will_disappear(ctx, ev).await,
        Event::TitleParametersDidChange(ev) => {
            instance.on_title_parameters_did_change(ctx, ev).await
        }
        Event::DeviceDidConnect(ev) => instance.on_device_did_connect(ctx, ev).await,
        Event::DeviceDidDisconnect(ev) => instance.on_device_did_disconnect(ctx, ev).await,
        Event::ApplicationDidLaunch(ev) => instance.on_application_did_launch(ctx, ev).await,
        Event::ApplicationDidTerminate(ev) => instance.on_application_did_terminate(ctx, ev).await,
        Event::SystemDidWakeUp => instance.on_system_did_wake_up(ctx).await,
        Event::PropertyInspectorDidAppear(ev) => {
            instance.on_property_inspector_did_appear(ctx, ev).await
        }
        Event::PropertyInspectorDidDisappear(ev) => {
            instance.on_property_inspector_did_disappear(ctx, ev).await
        }
        Event::SendToPlugin(ev) => instance.on_send_to_plugin(ctx, ev).await,
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Creates actors for keys seen for the first time.
///
/// Called synchronously while the supervisor's registry lock is held, so it
/// must not block or call back into the supervisor. Returning `None`
/// declines the key; the event that triggered the call is dropped.
pub trait InstanceFactory: Send + Sync + 'static {
    fn create(&self, key: &InstanceKey) -> Option<Box<dyn Instance>>;
}

impl<F> InstanceFactory for F
where
    F: Fn(&InstanceKey) -> Option<Box<dyn Instance>> + Send + Sync + 'static,
{
    fn create(&self, key: &InstanceKey) -> Option<Box<dyn Instance>> {
        self(key)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::memory;
    use deck_id::PluginUuid;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<&'static str>,
    }

    #[async_trait]
    impl Instance for Recorder {
        async fn on_key_down(&mut self, _ctx: &InstanceContext, _ev: KeyEvent) -> HandlerResult {
            self.seen.push("keyDown");
            Ok(())
        }

        async fn on_system_did_wake_up(&mut self, _ctx: &InstanceContext) -> HandlerResult {
            self.seen.push("systemDidWakeUp");
            Err(InstanceError::failed("sleepy"))
        }
    }

    fn context() -> (InstanceContext, memory::HostEnd, watch::Sender<bool>) {
        let (_inbound, outbound, host) = memory::pair();
        let outlet = Outlet::new(Arc::new(outbound), PluginUuid::new("plugin"));
        let (tx, rx) = watch::channel(false);
        (InstanceContext::new(InstanceKey::new("k1"), outlet, rx), host, tx)
    }

    #[tokio::test]
    async fn test_deliver_routes_to_matching_handler() {
        let (ctx, _host, _tx) = context();
        let mut recorder = Recorder::default();

        deliver(&mut recorder, &ctx, Event::KeyDown(KeyEvent::default()))
            .await
            .unwrap();
        let err = deliver(&mut recorder, &ctx, Event::SystemDidWakeUp)
            .await
            .unwrap_err();
        // No handler override; defaults to success.
        deliver(&mut recorder, &ctx, Event::KeyUp(KeyEvent::default()))
            .await
            .unwrap();

        assert_eq!(recorder.seen, vec!["keyDown", "systemDidWakeUp"]);
        assert!(!err.is_fatal());
        assert_eq!(recorder.name(), "instance");
    }

    #[tokio::test]
    async fn test_context_commands_address_own_key() {
        let (ctx, mut host, tx) = context();

        ctx.show_ok().await.unwrap();
        ctx.set_title("hi").await.unwrap();

        assert_eq!(
            host.recv_json().await.unwrap(),
            json!({"event": "showOk", "context": "k1"})
        );
        let title = host.recv_json().await.unwrap();
        assert_eq!(title["context"], json!("k1"));
        assert_eq!(title["payload"]["title"], json!("hi"));

        assert!(!ctx.is_shutdown());
        tx.send(true).unwrap();
        assert!(ctx.is_shutdown());
    }

    #[test]
    fn test_closure_factory() {
        let factory = |key: &InstanceKey| -> Option<Box<dyn Instance>> {
            (key.as_str() != "refused").then(|| Box::new(Recorder::default()) as Box<dyn Instance>)
        };

        assert!(factory.create(&InstanceKey::new("k1")).is_some());
        assert!(factory.create(&InstanceKey::new("refused")).is_none());
    }

    #[test]
    fn test_error_fatality() {
        assert!(InstanceError::fatal("x").is_fatal());
        assert!(!InstanceError::failed("x").is_fatal());
        assert!(!InstanceError::from(anyhow::anyhow!("x")).is_fatal());
    }
}
