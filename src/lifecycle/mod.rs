//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (handle.rs):
//!     DiscoveryConfig → compile RuleSet → bind listener → spawn serve task
//!
//! Stop (handle.rs):
//!     send on the handle's oneshot (or drop it) → stop accepting
//!     → drain in-flight → task exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop the foreground server
//! ```
//!
//! # Design Decisions
//! - Ordered startup: rules first, listener last (fail before binding)
//! - Restart is stop-then-start, never two listeners on one port

pub mod handle;
pub mod signals;

pub use handle::{ServerError, ServerHandle};
