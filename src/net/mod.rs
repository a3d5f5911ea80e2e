//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.tls set?
//!     → tls.rs (load PEM certificate and key into rustls)
//!     → Hand off to HTTP layer (HttpServer::run_tls)
//! otherwise
//!     → plain tokio TcpListener (HttpServer::run)
//! ```

pub mod tls;
