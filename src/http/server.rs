//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the rule set and create the Axum Router
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve discovery documents on every path and method
//! - Map declined requests to a plain 404
//! - Bind to plain TCP or TLS and shut down on signal

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::DiscoveryConfig;
use crate::discovery::{ConfigurationError, DiscoveryResponder, Disposition, RuleSet, CONTENT_TYPE};
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::observability::metrics::{self, Outcome};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<DiscoveryResponder>,
}

/// HTTP server for the discovery endpoint.
pub struct HttpServer {
    router: Router,
    config: DiscoveryConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if any configured rule is invalid; nothing is bound yet.
    pub fn new(config: DiscoveryConfig) -> Result<Self, Vec<ConfigurationError>> {
        let rules = RuleSet::from_config(
            &config.services,
            &config.canonical_ids,
            config.canonical_id.as_deref(),
        )?;

        tracing::info!(
            services = rules.services().len(),
            canonical_ids = rules.canonical_ids().len(),
            "Rule set compiled"
        );

        let state = AppState {
            responder: Arc::new(DiscoveryResponder::new(Arc::new(rules))),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DiscoveryConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(discovery_handler))
            .route("/", any(discovery_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The configured router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires or its sender drops.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: oneshot::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.await;
            })
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `listener` until `shutdown` fires or its sender drops.
    ///
    /// In-flight requests get `timeouts.shutdown_grace_secs` to finish.
    pub async fn run_tls(
        self,
        listener: std::net::TcpListener,
        tls: RustlsConfig,
        shutdown: oneshot::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::from_tcp_rustls(listener, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!(address = %addr, "HTTPS server stopped");
        Ok(())
    }
}

/// Serves the discovery document for the decoded request path, or 404.
async fn discovery_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id();
    let path = percent_decode_str(request.uri().path()).decode_utf8_lossy();

    let mut body = Vec::new();
    match state.responder.respond(&path, &mut body) {
        Ok(Disposition::Handled) => {
            metrics::record_request(Outcome::Handled, start_time);
            ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
        }
        Ok(Disposition::Declined) => {
            tracing::debug!(request_id = %request_id, path = %path, "Request declined");
            metrics::record_request(Outcome::Declined, start_time);
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Failed to write discovery document");
            metrics::record_request(Outcome::Error, start_time);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanonicalIdConfig, ServiceConfig};
    use crate::http::X_REQUEST_ID;
    use axum::http::Method;
    use tower::ServiceExt;

    fn config() -> DiscoveryConfig {
        DiscoveryConfig {
            services: vec![ServiceConfig {
                host_regex: Some("/user/.*".into()),
                uri: Some("http://op.example.com/server".into()),
                types: vec!["http://specs.openid.net/auth/2.0/signon".into()],
                ..Default::default()
            }],
            canonical_ids: vec![CanonicalIdConfig {
                host_regex: Some("/user/bob".into()),
                canonical_id: Some("=!bob".into()),
            }],
            ..Default::default()
        }
    }

    async fn send(method: Method, uri: &str) -> Response {
        let router = HttpServer::new(config()).unwrap().router();
        router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_match_serves_document() {
        let res = send(Method::GET, "/user/bob").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
        assert!(res.headers().contains_key(X_REQUEST_ID));

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<CanonicalID>=!bob</CanonicalID>"));
        assert!(body.contains("<URI>http://op.example.com/server</URI>"));
    }

    #[tokio::test]
    async fn test_query_string_ignored_for_matching() {
        let res = send(Method::GET, "/user/alice?openid.mode=checkid").await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_percent_encoded_path_decoded() {
        let mut config = config();
        config.services[0].host_regex = Some("/user/~bob".into());
        let router = HttpServer::new(config).unwrap().router();

        let res = router
            .oneshot(Request::builder().uri("/user/%7Ebob").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = send(Method::GET, "/user/b%6Fb").await;
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(body.to_vec()).unwrap().contains("<CanonicalID>=!bob</CanonicalID>"));
    }

    #[tokio::test]
    async fn test_any_method_is_served() {
        let res = send(Method::POST, "/user/alice").await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let res = send(Method::GET, "/").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_rules_fail_construction() {
        let mut config = config();
        config.services[0].types.clear();
        let errors = HttpServer::new(config).err().unwrap();
        assert_eq!(errors.len(), 1);
    }
}
