//! In-process channel backed by tokio mpsc queues.
//!
//! [`pair`] returns the plugin's two halves plus a [`HostEnd`] that plays the
//! host application: it injects raw events and observes written commands.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Inbound, Outbound};
use crate::error::ChannelError;

/// Receiving half fed by the host end.
#[derive(Debug)]
pub struct MemoryInbound {
    rx: mpsc::UnboundedReceiver<String>,
}

/// Sending half observed by the host end.
#[derive(Debug, Clone)]
pub struct MemoryOutbound {
    tx: mpsc::UnboundedSender<String>,
}

/// The host side of an in-process channel.
#[derive(Debug)]
pub struct HostEnd {
    to_plugin: Option<mpsc::UnboundedSender<String>>,
    from_plugin: mpsc::UnboundedReceiver<String>,
}

/// Creates a connected channel.
pub fn pair() -> (MemoryInbound, MemoryOutbound, HostEnd) {
    let (to_plugin, rx) = mpsc::unbounded_channel();
    let (tx, from_plugin) = mpsc::unbounded_channel();
    (
        MemoryInbound { rx },
        MemoryOutbound { tx },
        HostEnd {
            to_plugin: Some(to_plugin),
            from_plugin,
        },
    )
}

#[async_trait]
impl Inbound for MemoryInbound {
    async fn next_message(&mut self) -> Result<Option<String>, ChannelError> {
        Ok(self.rx.recv().await)
    }
}

#[async_trait]
impl Outbound for MemoryOutbound {
    async fn send_message(&self, raw: String) -> Result<(), ChannelError> {
        self.tx.send(raw).map_err(|_| ChannelError::Closed)
    }
}

impl HostEnd {
    /// Delivers one raw message to the plugin.
    pub fn send(&self, raw: impl Into<String>) -> Result<(), ChannelError> {
        match &self.to_plugin {
            Some(tx) => tx.send(raw.into()).map_err(|_| ChannelError::Closed),
            None => Err(ChannelError::Closed),
        }
    }

    /// Delivers one JSON value to the plugin.
    pub fn send_json(&self, value: &Value) -> Result<(), ChannelError> {
        self.send(value.to_string())
    }

    /// Ends the plugin's inbound stream.
    pub fn close(&mut self) {
        self.to_plugin = None;
    }

    /// Waits for the next message the plugin wrote.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_plugin.recv().await
    }

    /// Waits for the next message the plugin wrote, parsed as JSON.
    ///
    /// Returns `None` if the plugin side is gone or wrote invalid JSON.
    pub async fn recv_json(&mut self) -> Option<Value> {
        let raw = self.recv().await?;
        serde_json::from_str(&raw).ok()
    }

    /// Returns a written message if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_plugin.try_recv().ok()
    }
}
