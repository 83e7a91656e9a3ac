//! # deck-id
//!
//! Identifier types for the deck plugin runtime.
//!
//! ## Design Principles
//!
//! - IDs are assigned by the host application; the runtime never mints them
//! - IDs are opaque: no structure is assumed beyond "non-empty string"
//! - IDs are typed so an action UUID cannot be passed where an instance key
//!   is expected
//! - IDs serialize transparently as plain JSON strings
//!
//! ## ID Kinds
//!
//! - `InstanceKey`: one placed action on a device (the host's `context`).
//!   This is the routing key for actors.
//! - `ActionId`: the action UUID declared in the plugin manifest
//! - `DeviceId`: one physical or virtual device
//! - `PluginUuid`: the registration UUID handed to the plugin on launch,
//!   used as the default sender context for plugin-wide commands

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;
