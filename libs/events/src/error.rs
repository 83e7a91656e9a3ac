//! Error types for the envelope codec.

use thiserror::Error;

/// Errors that can occur when decoding an inbound message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The message is not a JSON object.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The message has no `event` discriminator.
    #[error("message has no event discriminator")]
    MissingKind,

    /// The discriminator names an event this protocol does not define.
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    /// The fields do not fit the selected event variant.
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },
}

impl DecodeError {
    /// Returns true if the message was well formed but named an unknown event.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, DecodeError::UnknownEventKind(_))
    }
}

/// Errors that can occur when encoding an outbound command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Serialization(err.to_string())
    }
}
