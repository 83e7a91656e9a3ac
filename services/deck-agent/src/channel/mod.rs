//! Message channel to the host application.
//!
//! The runtime only sees raw JSON text in both directions. Reading is
//! exclusive to the dispatch loop; writing is shared by every actor.

pub mod memory;
pub mod websocket;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Receiving half of the channel.
#[async_trait]
pub trait Inbound: Send {
    /// Waits for the next raw message.
    ///
    /// Returns `Ok(None)` once the host has closed the stream.
    async fn next_message(&mut self) -> Result<Option<String>, ChannelError>;
}

/// Sending half of the channel.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Writes one raw message.
    async fn send_message(&self, raw: String) -> Result<(), ChannelError>;
}
