//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! discovery server. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the discovery server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Services advertised for matching request paths.
    pub services: Vec<ServiceConfig>,

    /// Canonical IDs; the first matching entry is reported.
    pub canonical_ids: Vec<CanonicalIdConfig>,

    /// Canonical ID reported for every path no `canonical_ids` entry matches.
    pub canonical_id: Option<String>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Port override; replaces the port of `bind_address` when set.
    pub port: Option<u16>,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl ListenerConfig {
    /// The address to bind, with the port override applied.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        let mut addr: std::net::SocketAddr = self.bind_address.parse()?;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        Ok(addr)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            port: None,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// A discovered service. Required fields are optional here so that
/// missing ones are reported together by validation instead of by serde.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServiceConfig {
    /// Regular expression matched against the whole request path.
    pub host_regex: Option<String>,

    /// Endpoint reported in `<URI>`.
    pub uri: Option<String>,

    /// Service types reported in `<Type>`, in order.
    #[serde(default)]
    pub types: Vec<String>,

    /// Reported as the `priority` attribute when set.
    pub priority: Option<i32>,

    /// Reported in `<LocalID>` when set.
    pub local_id: Option<String>,
}

/// A canonical ID reported for matching request paths.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CanonicalIdConfig {
    /// Regular expression matched against the whole request path.
    pub host_regex: Option<String>,

    /// Value reported in `<CanonicalID>`.
    pub canonical_id: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,

    /// How long a stop waits for in-flight requests, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
