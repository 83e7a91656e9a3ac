//! Error types shared across the agent.

use deck_events::DecodeError;
use thiserror::Error;

/// Errors reported by a message channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The peer is gone; nothing more can be sent.
    #[error("channel closed")]
    Closed,

    /// Could not establish the connection.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport failed while reading or writing.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Reasons the dispatch loop stops with an error.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The host closed the inbound stream.
    #[error("inbound channel closed")]
    ChannelClosed,

    /// A message failed to decode under the abort policy.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl DispatchError {
    /// Returns true if the loop ended because the host went away.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, DispatchError::ChannelClosed)
    }
}
