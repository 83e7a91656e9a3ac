//! # deck-events
//!
//! Event and command definitions for the deck plugin protocol, and the codec
//! that maps them to and from JSON envelopes.
//!
//! ## Design Principles
//!
//! - Events and commands are closed tagged unions; the wire discriminator is
//!   the only thing that selects a variant
//! - Each event variant is statically either targeted (one instance key) or
//!   broadcast (every live instance)
//! - Each command variant statically declares its envelope shape: whether it
//!   has a payload and which correlation fields it hoists to the top level
//! - Fields a variant does not declare are omitted from the wire, never `null`
//!
//! ## Envelopes
//!
//! Inbound:
//!
//! ```text
//! {"event": "keyDown", "context": "...", "action": "...", "device": "...",
//!  "payload": {"settings": {}, "coordinates": {"row": 0, "column": 1}, ...}}
//! ```
//!
//! Outbound:
//!
//! ```text
//! {"event": "setTitle", "context": "...", "payload": {"title": "hi", "target": 0, "state": 0}}
//! ```

mod command;
mod envelope;
mod error;
mod event;
mod types;

pub use command::*;
pub use envelope::{decode, encode, CommandEnvelope};
pub use error::{DecodeError, EncodeError};
pub use event::*;
pub use types::*;
