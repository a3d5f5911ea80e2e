//! XRDS discovery server.
//!
//! Emulates an XRDS/Yadis discovery endpoint so that discovery-capable
//! clients can be integration-tested against a known set of services.
//!
//! # Architecture Overview
//!
//! ```text
//!     config.toml ──▶ config::loader ──▶ config::validation
//!                                              │
//!                                              ▼
//!                                   discovery::RuleSet (immutable, Arc)
//!                                              │
//!     Client Request    ┌─────────┐    ┌──────────────────┐
//!     ─────────────────▶│  http   │───▶│ discovery        │
//!                       │ server  │    │ responder        │
//!                       └─────────┘    └────────┬─────────┘
//!                            ▲                  │ resolve(path)
//!                            │                  ▼
//!     ◀── 200 xrds+xml ──────┤         ┌──────────────────┐
//!     ◀── 404 (declined) ────┘◀────────│ DocumentWriter   │
//!                                      └──────────────────┘
//! ```
//!
//! Runs in the foreground until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;

use xrds_discovery_server::config::load_config;
use xrds_discovery_server::lifecycle::signals::shutdown_signal;
use xrds_discovery_server::lifecycle::ServerHandle;
use xrds_discovery_server::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "xrds-discovery-server")]
#[command(about = "Emulated XRDS discovery endpoint for integration tests", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "discovery.toml")]
    config: PathBuf,

    /// Override the listener port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.listener.port = Some(port);
    }

    let level = cli
        .log_level
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init(&level, config.observability.log_format)?;

    tracing::info!("xrds-discovery-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        port = ?config.listener.port,
        tls = config.listener.tls.is_some(),
        services = config.services.len(),
        canonical_ids = config.canonical_ids.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let handle = ServerHandle::start(config).await?;
    handle.run_until(shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
