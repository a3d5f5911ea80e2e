//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every rule once so pattern and field errors stop startup
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DiscoveryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::DiscoveryConfig;
use crate::discovery::error::ConfigurationError;
use crate::discovery::RuleSet;

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a valid socket address")]
    MetricsAddress(String),

    #[error("at least one service must be configured")]
    NoServices,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error(transparent)]
    Rule(#[from] ConfigurationError),
}

/// Check `config`, reporting every problem found.
pub fn validate_config(config: &DiscoveryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }

    if let Err(rule_errors) = RuleSet::from_config(
        &config.services,
        &config.canonical_ids,
        config.canonical_id.as_deref(),
    ) {
        errors.extend(rule_errors.into_iter().map(ValidationError::Rule));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
