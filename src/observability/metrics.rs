//! Metrics collection and exposition.
//!
//! # Metrics
//! - `discovery_requests_total` (counter): requests by outcome
//!   (`handled`, `declined`, `error`)
//! - `discovery_request_duration_seconds` (histogram): time to resolve and
//!   serialize

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Outcome label of a discovery request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Declined,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Handled => "handled",
            Outcome::Declined => "declined",
            Outcome::Error => "error",
        }
    }
}

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished discovery request.
pub fn record_request(outcome: Outcome, start: Instant) {
    metrics::counter!("discovery_requests_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("discovery_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
