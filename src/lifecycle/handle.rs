//! Owned handle to a running discovery server.
//!
//! # Responsibilities
//! - Build the rule set before anything is bound
//! - Bind the listener (plain or TLS) and spawn the serve task
//! - Stop, restart, or wait on that one server
//!
//! # Design Decisions
//! - No process-wide server slot; whoever starts a server owns its handle
//! - Restart fully stops the old listener before binding the new one
//! - Dropping the handle drops the stop sender, which also stops the server

use std::future::Future;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};

use crate::config::DiscoveryConfig;
use crate::discovery::ConfigurationError;
use crate::http::HttpServer;
use crate::net::tls::load_tls_config;

/// Error type for server lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid discovery rules: {}", join_errors(.0))]
    Configuration(Vec<ConfigurationError>),

    #[error("invalid listener address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("failed to bind: {0}")]
    Bind(std::io::Error),

    #[error("failed to load TLS configuration: {0}")]
    Tls(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
}

fn join_errors(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A running discovery server.
///
/// Dropping the handle without calling [`stop`](Self::stop) also shuts the
/// server down, but does not wait for it.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl ServerHandle {
    /// Compile the rules in `config`, bind, and start serving.
    pub async fn start(config: DiscoveryConfig) -> Result<Self, ServerError> {
        let addr = config.listener.socket_addr()?;
        let tls = config.listener.tls.clone();
        let server = HttpServer::new(config).map_err(ServerError::Configuration)?;

        let (shutdown, signal) = oneshot::channel();

        let (local_addr, task) = match tls {
            None => {
                let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
                let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
                (local_addr, tokio::spawn(server.run(listener, signal)))
            }
            Some(tls) => {
                let tls_config = load_tls_config(&tls).await.map_err(ServerError::Tls)?;
                let listener = std::net::TcpListener::bind(addr).map_err(ServerError::Bind)?;
                listener.set_nonblocking(true).map_err(ServerError::Bind)?;
                let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
                (local_addr, tokio::spawn(server.run_tls(listener, tls_config, signal)))
            }
        };

        tracing::info!(address = %local_addr, "Discovery server started");

        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    /// The address the server is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting requests and wait for the server to finish.
    pub async fn stop(self) -> Result<(), ServerError> {
        tracing::info!(address = %self.local_addr, "Stopping discovery server");
        let Self { shutdown, task, .. } = self;
        let _ = shutdown.send(());
        task.await?.map_err(ServerError::Serve)
    }

    /// Stop this server, then start a new one from `config`.
    pub async fn restart(self, config: DiscoveryConfig) -> Result<Self, ServerError> {
        self.stop().await?;
        Self::start(config).await
    }

    /// Wait until the server exits on its own.
    pub async fn join(self) -> Result<(), ServerError> {
        let Self { shutdown, task, .. } = self;
        let result = task.await;
        drop(shutdown);
        result?.map_err(ServerError::Serve)
    }

    /// Serve until `signal` completes, then stop.
    pub async fn run_until<F>(mut self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = &mut self.task => {
                return result?.map_err(ServerError::Serve);
            }
            _ = signal => {}
        }
        self.stop().await
    }
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("local_addr", &self.local_addr)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
