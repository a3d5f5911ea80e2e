//! Per-request discovery outcome.

use crate::discovery::rules::{CanonicalIdRule, ServiceRule};

/// The rules that matched one request path.
///
/// Borrows from the [`RuleSet`](crate::discovery::RuleSet) it was resolved
/// against and is dropped once the response is written.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult<'a> {
    services: Vec<&'a ServiceRule>,
    canonical_id: Option<&'a CanonicalIdRule>,
}

impl<'a> DiscoveryResult<'a> {
    pub fn new(services: Vec<&'a ServiceRule>, canonical_id: Option<&'a CanonicalIdRule>) -> Self {
        Self {
            services,
            canonical_id,
        }
    }

    /// Matched services, in configuration order.
    pub fn services(&self) -> &[&'a ServiceRule] {
        &self.services
    }

    pub fn canonical_id(&self) -> Option<&'a CanonicalIdRule> {
        self.canonical_id
    }

    /// True when nothing matched. An empty result is never served.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.canonical_id.is_none()
    }
}
