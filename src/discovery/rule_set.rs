//! Rule storage and path resolution.
//!
//! # Responsibilities
//! - Compile configured rules at startup, reporting every failure
//! - Resolve a request path to the services and canonical ID it matches
//!
//! # Design Decisions
//! - Immutable after construction; shared via `Arc`, no locking
//! - Services accumulate: every matching rule contributes
//! - Canonical IDs are first-match-wins in configuration order

use crate::config::schema::{CanonicalIdConfig, ServiceConfig};
use crate::discovery::error::ConfigurationError;
use crate::discovery::result::DiscoveryResult;
use crate::discovery::rules::{CanonicalIdRule, ServiceRule};

/// Pattern used for the unconditional `canonical_id` config entry.
pub const MATCH_ALL: &str = ".*";

/// Ordered, immutable collection of discovery rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    services: Vec<ServiceRule>,
    canonical_ids: Vec<CanonicalIdRule>,
}

impl RuleSet {
    pub fn new(services: Vec<ServiceRule>, canonical_ids: Vec<CanonicalIdRule>) -> Self {
        Self {
            services,
            canonical_ids,
        }
    }

    /// Compile rules from configuration.
    ///
    /// `default_canonical_id`, when set, is appended after all
    /// `canonical_ids` and matches every path.
    pub fn from_config(
        services: &[ServiceConfig],
        canonical_ids: &[CanonicalIdConfig],
        default_canonical_id: Option<&str>,
    ) -> Result<Self, Vec<ConfigurationError>> {
        let mut errors = Vec::new();

        let services: Vec<ServiceRule> = services
            .iter()
            .enumerate()
            .filter_map(|entry| ServiceRule::try_from(entry).map_err(|e| errors.push(e)).ok())
            .collect();

        let mut canonical_rules: Vec<CanonicalIdRule> = canonical_ids
            .iter()
            .enumerate()
            .filter_map(|entry| CanonicalIdRule::try_from(entry).map_err(|e| errors.push(e)).ok())
            .collect();

        if let Some(canonical_id) = default_canonical_id {
            match CanonicalIdRule::builder()
                .host_regex(MATCH_ALL)
                .canonical_id(canonical_id)
                .build()
            {
                Ok(rule) => canonical_rules.push(rule),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self::new(services, canonical_rules))
    }

    /// Find every service and the first canonical ID matching `path`.
    pub fn resolve(&self, path: &str) -> DiscoveryResult<'_> {
        let services = self.services.iter().filter(|s| s.matches(path)).collect();
        let canonical_id = self.canonical_ids.iter().find(|c| c.matches(path));
        DiscoveryResult::new(services, canonical_id)
    }

    pub fn services(&self) -> &[ServiceRule] {
        &self.services
    }

    pub fn canonical_ids(&self) -> &[CanonicalIdRule] {
        &self.canonical_ids
    }
}
