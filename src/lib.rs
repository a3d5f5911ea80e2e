//! Emulated XRDS/Yadis discovery endpoint.
//!
//! Configured rules map request paths to services and canonical IDs; the
//! server answers each matching request with an XRDS document and declines
//! (404) everything else.

pub mod config;
pub mod discovery;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::DiscoveryConfig;
pub use discovery::{DiscoveryResponder, DocumentWriter, RuleSet};
pub use http::HttpServer;
pub use lifecycle::ServerHandle;
