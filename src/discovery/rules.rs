//! Service and canonical-ID rules.
//!
//! # Responsibilities
//! - Compile host patterns once, anchored at both ends
//! - Validate required fields when the rule is built
//! - Hand out immutable, fully validated rules
//!
//! # Design Decisions
//! - Builders collect fields; `build()` is the only way to get a rule
//! - A built rule never has an unset field, so reads are infallible
//! - Patterns are whole-path matches (`^(?:..)$`), never substring

use regex::Regex;

use crate::config::schema::{CanonicalIdConfig, ServiceConfig};
use crate::discovery::error::{ConfigurationError, RuleKind, RuleRef, StateError};

/// A compiled host pattern. Matches only when the whole path matches.
#[derive(Debug, Clone)]
pub struct HostPattern {
    source: String,
    regex: Regex,
}

impl HostPattern {
    /// Compile `pattern` for whole-string matching.
    ///
    /// The pattern must be valid on its own before it is anchored, so an
    /// unbalanced `)` cannot close the anchoring group.
    pub fn compile(pattern: &str, rule: RuleRef) -> Result<Self, ConfigurationError> {
        let invalid = |source| ConfigurationError::InvalidPattern {
            rule,
            pattern: pattern.to_string(),
            source,
        };

        Regex::new(pattern).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(invalid)?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true if the entire `path` matches the pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as configured, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Reject characters XML 1.0 cannot carry, even escaped.
fn check_xml_text(value: &str, rule: RuleRef, field: &'static str) -> Result<(), ConfigurationError> {
    let allowed = |c: char| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    };

    match value.chars().find(|c| !allowed(*c)) {
        Some(c) => Err(ConfigurationError::InvalidCharacter {
            rule,
            field,
            code: c as u32,
        }),
        None => Ok(()),
    }
}

/// A service advertised in the discovery document for matching paths.
#[derive(Debug, Clone)]
pub struct ServiceRule {
    index: Option<usize>,
    host_pattern: HostPattern,
    endpoint_uri: String,
    types: Vec<String>,
    priority: Option<i32>,
    local_id: Option<String>,
}

impl ServiceRule {
    pub fn builder() -> ServiceRuleBuilder {
        ServiceRuleBuilder::default()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.host_pattern.matches(path)
    }

    pub fn host_pattern(&self) -> &HostPattern {
        &self.host_pattern
    }

    pub fn endpoint_uri(&self) -> &str {
        &self.endpoint_uri
    }

    /// Service types in insertion order, without duplicates. Never empty.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    /// Position in the configured service list, if built from config.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

/// Collects the fields of a [`ServiceRule`].
#[derive(Debug, Clone, Default)]
pub struct ServiceRuleBuilder {
    index: Option<usize>,
    host_regex: Option<String>,
    uri: Option<String>,
    types: Option<Vec<String>>,
    priority: Option<i32>,
    local_id: Option<String>,
}

impl ServiceRuleBuilder {
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn host_regex(mut self, host_regex: impl Into<String>) -> Self {
        self.host_regex = Some(host_regex.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add a service type. Duplicates keep their first position.
    pub fn add_type(mut self, service_type: impl Into<String>) -> Self {
        let service_type = service_type.into();
        let types = self.types.get_or_insert_with(Vec::new);
        if !types.contains(&service_type) {
            types.push(service_type);
        }
        self
    }

    pub fn types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        types.into_iter().fold(self, |b, t| b.add_type(t))
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn local_id(mut self, local_id: impl Into<String>) -> Self {
        self.local_id = Some(local_id.into());
        self
    }

    fn rule_ref(&self) -> RuleRef {
        RuleRef::new(RuleKind::Service, self.index)
    }

    pub fn get_host_regex(&self) -> Result<&str, StateError> {
        self.host_regex.as_deref().ok_or(StateError {
            rule: self.rule_ref(),
            field: "host_regex",
        })
    }

    pub fn get_uri(&self) -> Result<&str, StateError> {
        self.uri.as_deref().ok_or(StateError {
            rule: self.rule_ref(),
            field: "uri",
        })
    }

    pub fn get_types(&self) -> Result<&[String], StateError> {
        match self.types.as_deref() {
            Some(types) if !types.is_empty() => Ok(types),
            _ => Err(StateError {
                rule: self.rule_ref(),
                field: "types",
            }),
        }
    }

    /// Validate and compile the rule.
    pub fn build(self) -> Result<ServiceRule, ConfigurationError> {
        let rule = self.rule_ref();

        let host_pattern = HostPattern::compile(self.get_host_regex()?, rule)?;

        let uri = self.get_uri()?;
        if uri.is_empty() {
            return Err(ConfigurationError::EmptyField { rule, field: "uri" });
        }
        check_xml_text(uri, rule, "uri")?;
        let endpoint_uri = uri.to_string();

        let types = self.get_types()?.to_vec();
        for service_type in &types {
            check_xml_text(service_type, rule, "types")?;
        }
        if let Some(local_id) = &self.local_id {
            check_xml_text(local_id, rule, "local_id")?;
        }

        Ok(ServiceRule {
            index: self.index,
            host_pattern,
            endpoint_uri,
            types,
            priority: self.priority,
            local_id: self.local_id,
        })
    }
}

impl TryFrom<(usize, &ServiceConfig)> for ServiceRule {
    type Error = ConfigurationError;

    fn try_from((index, config): (usize, &ServiceConfig)) -> Result<Self, Self::Error> {
        let mut builder = ServiceRule::builder().index(index);
        if let Some(host_regex) = &config.host_regex {
            builder = builder.host_regex(host_regex.as_str());
        }
        if let Some(uri) = &config.uri {
            builder = builder.uri(uri.as_str());
        }
        builder = builder.types(config.types.iter().map(String::as_str));
        if let Some(priority) = config.priority {
            builder = builder.priority(priority);
        }
        if let Some(local_id) = &config.local_id {
            builder = builder.local_id(local_id.as_str());
        }
        builder.build()
    }
}

/// A canonical identifier reported for matching paths.
#[derive(Debug, Clone)]
pub struct CanonicalIdRule {
    index: Option<usize>,
    host_pattern: HostPattern,
    canonical_id: String,
}

impl CanonicalIdRule {
    pub fn builder() -> CanonicalIdRuleBuilder {
        CanonicalIdRuleBuilder::default()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.host_pattern.matches(path)
    }

    pub fn host_pattern(&self) -> &HostPattern {
        &self.host_pattern
    }

    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

/// Collects the fields of a [`CanonicalIdRule`].
#[derive(Debug, Clone, Default)]
pub struct CanonicalIdRuleBuilder {
    index: Option<usize>,
    host_regex: Option<String>,
    canonical_id: Option<String>,
}

impl CanonicalIdRuleBuilder {
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn host_regex(mut self, host_regex: impl Into<String>) -> Self {
        self.host_regex = Some(host_regex.into());
        self
    }

    pub fn canonical_id(mut self, canonical_id: impl Into<String>) -> Self {
        self.canonical_id = Some(canonical_id.into());
        self
    }

    fn rule_ref(&self) -> RuleRef {
        RuleRef::new(RuleKind::CanonicalId, self.index)
    }

    pub fn get_host_regex(&self) -> Result<&str, StateError> {
        self.host_regex.as_deref().ok_or(StateError {
            rule: self.rule_ref(),
            field: "host_regex",
        })
    }

    pub fn get_canonical_id(&self) -> Result<&str, StateError> {
        self.canonical_id.as_deref().ok_or(StateError {
            rule: self.rule_ref(),
            field: "canonical_id",
        })
    }

    pub fn build(self) -> Result<CanonicalIdRule, ConfigurationError> {
        let rule = self.rule_ref();

        let host_pattern = HostPattern::compile(self.get_host_regex()?, rule)?;

        let canonical_id = self.get_canonical_id()?;
        if canonical_id.is_empty() {
            return Err(ConfigurationError::EmptyField {
                rule,
                field: "canonical_id",
            });
        }
        check_xml_text(canonical_id, rule, "canonical_id")?;
        let canonical_id = canonical_id.to_string();

        Ok(CanonicalIdRule {
            index: self.index,
            host_pattern,
            canonical_id,
        })
    }
}

impl TryFrom<(usize, &CanonicalIdConfig)> for CanonicalIdRule {
    type Error = ConfigurationError;

    fn try_from((index, config): (usize, &CanonicalIdConfig)) -> Result<Self, Self::Error> {
        let mut builder = CanonicalIdRule::builder().index(index);
        if let Some(host_regex) = &config.host_regex {
            builder = builder.host_regex(host_regex.as_str());
        }
        if let Some(canonical_id) = &config.canonical_id {
            builder = builder.canonical_id(canonical_id.as_str());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_whole_string() {
        let rule = ServiceRule::builder()
            .host_regex("[a-c]+123")
            .uri("http://abc")
            .add_type("t")
            .build()
            .unwrap();

        assert!(rule.matches("acb123"));
        assert!(rule.matches("acc123"));
        assert!(!rule.matches("xyz123"));
        // A substring match is not enough
        assert!(!rule.matches("xacb123"));
        assert!(!rule.matches("acb1234"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let rule = CanonicalIdRule::builder()
            .host_regex("/a|/b")
            .canonical_id("=!1")
            .build()
            .unwrap();

        assert!(rule.matches("/a"));
        assert!(rule.matches("/b"));
        assert!(!rule.matches("/a/b"));
        assert!(!rule.matches("x/b"));
    }

    #[test]
    fn test_types_deduplicated_in_insertion_order() {
        let rule = ServiceRule::builder()
            .host_regex(".*")
            .uri("http://u")
            .types(["b", "a", "b", "c"])
            .build()
            .unwrap();

        assert_eq!(rule.types(), ["b", "a", "c"]);
    }

    #[test]
    fn test_optional_fields_stay_unset() {
        let rule = ServiceRule::builder()
            .host_regex(".*")
            .uri("http://u")
            .add_type("t")
            .build()
            .unwrap();

        assert_eq!(rule.priority(), None);
        assert_eq!(rule.local_id(), None);
    }

    #[test]
    fn test_missing_types_is_configuration_error() {
        let err = ServiceRule::builder()
            .index(3)
            .host_regex(".*")
            .uri("http://u")
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::MissingField { field: "types", .. }
        ));
        assert_eq!(err.to_string(), "service[3]: required field `types` is missing");
    }

    #[test]
    fn test_missing_uri_and_empty_uri() {
        let missing = ServiceRule::builder()
            .host_regex(".*")
            .add_type("t")
            .build()
            .unwrap_err();
        assert!(matches!(missing, ConfigurationError::MissingField { field: "uri", .. }));

        let empty = ServiceRule::builder()
            .host_regex(".*")
            .uri("")
            .add_type("t")
            .build()
            .unwrap_err();
        assert!(matches!(empty, ConfigurationError::EmptyField { field: "uri", .. }));
    }

    #[test]
    fn test_invalid_pattern_rejected_at_build() {
        let err = CanonicalIdRule::builder()
            .index(0)
            .host_regex("[unclosed")
            .canonical_id("=!1")
            .build()
            .unwrap_err();

        match err {
            ConfigurationError::InvalidPattern { pattern, rule, .. } => {
                assert_eq!(pattern, "[unclosed");
                assert_eq!(rule.to_string(), "canonical_id[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbalanced_paren_rejected() {
        let err = ServiceRule::builder()
            .host_regex("/a)|(/b")
            .uri("http://u")
            .add_type("t")
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_lookaround_unsupported() {
        let err = CanonicalIdRule::builder()
            .host_regex("/(?!admin).*")
            .canonical_id("=!1")
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_control_characters_rejected() {
        let err = ServiceRule::builder()
            .host_regex(".*")
            .uri("http://u")
            .add_type("t\u{1}")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidCharacter { field: "types", code: 1, .. }
        ));

        let err = CanonicalIdRule::builder()
            .host_regex(".*")
            .canonical_id("=!\u{FFFF}")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidCharacter { field: "canonical_id", code: 0xFFFF, .. }
        ));

        let ok = ServiceRule::builder()
            .host_regex(".*")
            .uri("http://u")
            .add_type("t")
            .local_id("tab\there\r\n")
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_unset_builder_field_is_state_error() {
        let builder = ServiceRule::builder().host_regex(".*");
        let err = builder.get_types().unwrap_err();
        assert_eq!(err.field, "types");
        assert!(builder.get_uri().is_err());
        assert_eq!(builder.get_host_regex().unwrap(), ".*");
    }

    #[test]
    fn test_empty_canonical_id_rejected() {
        let err = CanonicalIdRule::builder()
            .host_regex(".*")
            .canonical_id("")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::EmptyField { field: "canonical_id", .. }
        ));
    }

    #[test]
    fn test_from_config() {
        let config = ServiceConfig {
            host_regex: Some(".*/test".into()),
            uri: Some("http://test1".into()),
            types: vec!["t".into()],
            priority: Some(10),
            local_id: Some("local".into()),
        };
        let rule = ServiceRule::try_from((4, &config)).unwrap();
        assert_eq!(rule.index(), Some(4));
        assert_eq!(rule.endpoint_uri(), "http://test1");
        assert_eq!(rule.priority(), Some(10));
        assert_eq!(rule.local_id(), Some("local"));
        assert_eq!(rule.host_pattern().as_str(), ".*/test");
    }
}
