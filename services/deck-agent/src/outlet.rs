//! Outbound command writer.
//!
//! An [`Outlet`] pairs the shared outbound channel with the plugin UUID that
//! commands without an instance context are addressed from. It is cheap to
//! clone and is handed to every actor.

use std::fmt;
use std::sync::Arc;

use deck_events::{
    encode, Command, EncodeError, Image, OpenUrl, SendToPropertyInspector, SetImage, SetState,
    SetTitle, SwitchToProfile, Target,
};
use deck_id::{ActionId, DeviceId, InstanceKey, PluginUuid};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::channel::Outbound;
use crate::error::ChannelError;

/// Errors from sending a command.
#[derive(Debug, Error)]
pub enum OutletError {
    #[error("failed to encode command: {0}")]
    Encode(#[from] EncodeError),

    #[error("failed to send command: {0}")]
    Channel(#[from] ChannelError),
}

/// Cloneable handle for writing commands to the host.
#[derive(Clone)]
pub struct Outlet {
    outbound: Arc<dyn Outbound>,
    sender: PluginUuid,
}

impl fmt::Debug for Outlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outlet")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl Outlet {
    pub fn new(outbound: Arc<dyn Outbound>, sender: PluginUuid) -> Self {
        Self { outbound, sender }
    }

    /// The plugin UUID used as the default envelope context.
    pub fn sender(&self) -> &PluginUuid {
        &self.sender
    }

    /// Encodes and writes one command.
    pub async fn send(&self, cmd: &Command) -> Result<(), OutletError> {
        let raw = encode(cmd, &self.sender)?;
        trace!(command = %cmd.kind(), "Sending command");
        self.outbound.send_message(raw).await?;
        Ok(())
    }

    pub async fn show_ok(&self, context: InstanceKey) -> Result<(), OutletError> {
        self.send(&Command::show_ok(context)).await
    }

    pub async fn show_alert(&self, context: InstanceKey) -> Result<(), OutletError> {
        self.send(&Command::show_alert(context)).await
    }

    /// Sets the title; an empty title restores the user's own.
    pub async fn set_title(
        &self,
        context: InstanceKey,
        title: impl Into<String>,
        target: Target,
        state: u32,
    ) -> Result<(), OutletError> {
        self.send(&Command::SetTitle(SetTitle {
            context,
            title: title.into(),
            target,
            state,
        }))
        .await
    }

    /// Sets the image; `None` restores the manifest image.
    pub async fn set_image(
        &self,
        context: InstanceKey,
        image: Option<Image>,
        target: Target,
        state: u32,
    ) -> Result<(), OutletError> {
        self.send(&Command::SetImage(SetImage {
            context,
            image,
            target,
            state,
        }))
        .await
    }

    pub async fn set_state(&self, context: InstanceKey, state: u32) -> Result<(), OutletError> {
        self.send(&Command::SetState(SetState { context, state }))
            .await
    }

    pub async fn set_settings(
        &self,
        context: InstanceKey,
        settings: Value,
    ) -> Result<(), OutletError> {
        self.send(&Command::SetSettings { context, settings }).await
    }

    pub async fn get_settings(&self, context: InstanceKey) -> Result<(), OutletError> {
        self.send(&Command::GetSettings { context }).await
    }

    pub async fn set_global_settings(&self, settings: Value) -> Result<(), OutletError> {
        self.send(&Command::SetGlobalSettings { settings }).await
    }

    pub async fn get_global_settings(&self) -> Result<(), OutletError> {
        self.send(&Command::GetGlobalSettings).await
    }

    pub async fn open_url(&self, url: impl Into<String>) -> Result<(), OutletError> {
        self.send(&Command::OpenUrl(OpenUrl { url: url.into() }))
            .await
    }

    pub async fn switch_to_profile(
        &self,
        device: DeviceId,
        profile: impl Into<String>,
    ) -> Result<(), OutletError> {
        self.send(&Command::SwitchToProfile(SwitchToProfile {
            device,
            profile: profile.into(),
        }))
        .await
    }

    pub async fn send_to_property_inspector(
        &self,
        context: InstanceKey,
        action: ActionId,
        payload: Value,
    ) -> Result<(), OutletError> {
        self.send(&Command::SendToPropertyInspector(SendToPropertyInspector {
            context,
            action,
            payload,
        }))
        .await
    }

    /// Writes a line to the host's plugin log.
    pub async fn log(&self, message: impl Into<String>) -> Result<(), OutletError> {
        self.send(&Command::log(message)).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::memory;
    use serde_json::json;

    fn outlet() -> (Outlet, memory::HostEnd) {
        let (_inbound, outbound, host) = memory::pair();
        (
            Outlet::new(Arc::new(outbound), PluginUuid::new("plugin-1")),
            host,
        )
    }

    #[tokio::test]
    async fn test_log_uses_plugin_context() {
        let (outlet, mut host) = outlet();
        outlet.log("hello").await.unwrap();

        let sent = host.recv_json().await.unwrap();
        assert_eq!(
            sent,
            json!({"event": "logMessage", "context": "plugin-1", "payload": {"message": "hello"}})
        );
    }

    #[tokio::test]
    async fn test_set_title_uses_instance_context() {
        let (outlet, mut host) = outlet();
        outlet
            .set_title(InstanceKey::new("k1"), "12:00:00", Target::Both, 0)
            .await
            .unwrap();

        let sent = host.recv_json().await.unwrap();
        assert_eq!(sent["context"], json!("k1"));
        assert_eq!(
            sent["payload"],
            json!({"title": "12:00:00", "target": 0, "state": 0})
        );
    }

    #[tokio::test]
    async fn test_switch_to_profile_hoists_device() {
        let (outlet, mut host) = outlet();
        outlet
            .switch_to_profile(DeviceId::new("dev-1"), "Main")
            .await
            .unwrap();

        let sent = host.recv_json().await.unwrap();
        assert_eq!(sent["context"], json!("plugin-1"));
        assert_eq!(sent["device"], json!("dev-1"));
        assert_eq!(sent["payload"], json!({"profile": "Main"}));
    }

    #[tokio::test]
    async fn test_send_after_host_gone_is_channel_error() {
        let (outlet, host) = outlet();
        drop(host);

        let err = outlet.show_ok(InstanceKey::new("k1")).await.unwrap_err();
        assert!(matches!(err, OutletError::Channel(ChannelError::Closed)));
    }
}
