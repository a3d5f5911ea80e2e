//! Discovery subsystem: request matching and document synthesis.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ServiceConfig[] + CanonicalIdConfig[]
//!     → rules.rs (validate fields, compile anchored patterns)
//!     → rule_set.rs (freeze as immutable RuleSet, shared via Arc)
//!
//! Per request:
//!     path
//!     → responder.rs → RuleSet::resolve
//!     → result.rs (matched services + first canonical ID)
//!     → empty? Declined : writer.rs → XRDS bytes
//! ```
//!
//! # Design Decisions
//! - Every matching service is reported; only the first canonical ID is
//! - Patterns match the whole path
//! - Rule errors surface at startup, never per request
//! - No-match is a disposition, not an error

pub mod error;
pub mod responder;
pub mod result;
pub mod rule_set;
pub mod rules;
pub mod writer;

pub use error::{ConfigurationError, SerializationError, StateError};
pub use responder::{DiscoveryResponder, Disposition, CONTENT_TYPE};
pub use result::DiscoveryResult;
pub use rule_set::RuleSet;
pub use rules::{CanonicalIdRule, ServiceRule};
pub use writer::DocumentWriter;
