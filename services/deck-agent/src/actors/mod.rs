//! Keyed actor runtime.
//!
//! ## Design Principles
//!
//! - **One actor per key**: each instance key owns one handler value and one
//!   mailbox; handlers for the same key never run concurrently
//! - **Lazy spawn**: actors are created on the first targeted event for a key
//! - **Crash isolation**: a panicking or fatally failing handler ends its own
//!   actor only; the next event for the key starts a fresh one
//! - **No restarts**: a terminated actor is never revived with its old state
//!
//! ```text
//! Supervisor
//! ├── registry: InstanceKey -> InstanceHandle
//! └── worker(key)  one task per live key
//!     └── Mailbox<Event> + Notify
//! ```

mod instance;
mod mailbox;
mod supervisor;
mod worker;

pub use instance::{
    deliver, HandlerResult, Instance, InstanceContext, InstanceError, InstanceFactory,
};
pub use mailbox::Mailbox;
pub use supervisor::Supervisor;
pub use worker::InstanceState;
