//! deck Agent Library
//!
//! Runtime for Stream Deck style plugins. One process holds one websocket
//! connection to the host application; every event arriving on it is routed
//! to a per-key actor.
//!
//! ## Architecture
//!
//! ```text
//! channel ─> dispatch loop ─> decode ─> Supervisor::route
//!                                          │
//!                       ┌──────────────────┼──────────────────┐
//!                   worker(k1)         worker(k2)          worker(k3)
//!                       └──────────> Outlet ─> channel <──────┘
//! ```
//!
//! ## Modules
//!
//! - `actors`: handler API, mailbox, worker loop and supervisor
//! - `channel`: raw message transport (websocket and in-memory)
//! - `dispatch`: the sequential read-decode-route loop
//! - `outlet`: command encoding and writing
//! - `diagnostics`: non-fatal runtime problems

pub mod actors;
pub mod channel;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod outlet;

pub use actors::{Instance, InstanceContext, InstanceError, InstanceFactory, Supervisor};
pub use config::{DecodePolicy, PluginArgs, Registration, RuntimeConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use dispatch::run_dispatch_loop;
pub use error::{ChannelError, DispatchError};
pub use outlet::{Outlet, OutletError};
