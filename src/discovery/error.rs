//! Error taxonomy for the discovery core.
//!
//! A path that matches nothing is not an error; see
//! [`Disposition::Declined`](crate::discovery::Disposition::Declined).

use thiserror::Error;

/// Which kind of rule an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Service,
    CanonicalId,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Service => write!(f, "service"),
            RuleKind::CanonicalId => write!(f, "canonical_id"),
        }
    }
}

/// Location of a rule within its configured list, e.g. `service[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleRef {
    pub kind: RuleKind,
    pub index: Option<usize>,
}

impl RuleRef {
    pub fn new(kind: RuleKind, index: Option<usize>) -> Self {
        Self { kind, index }
    }
}

impl std::fmt::Display for RuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.kind, i),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// A rule could not be built. Fatal to startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{rule}: required field `{field}` is missing")]
    MissingField { rule: RuleRef, field: &'static str },

    #[error("{rule}: field `{field}` must not be empty")]
    EmptyField { rule: RuleRef, field: &'static str },

    #[error("{rule}: invalid host pattern `{pattern}`: {source}")]
    InvalidPattern {
        rule: RuleRef,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{rule}: field `{field}` contains character U+{code:04X}, which XML does not allow")]
    InvalidCharacter {
        rule: RuleRef,
        field: &'static str,
        code: u32,
    },
}

impl ConfigurationError {
    /// The rule this error was reported against.
    pub fn rule(&self) -> RuleRef {
        match self {
            ConfigurationError::MissingField { rule, .. }
            | ConfigurationError::EmptyField { rule, .. }
            | ConfigurationError::InvalidPattern { rule, .. }
            | ConfigurationError::InvalidCharacter { rule, .. } => *rule,
        }
    }
}

impl From<StateError> for ConfigurationError {
    fn from(err: StateError) -> Self {
        ConfigurationError::MissingField {
            rule: err.rule,
            field: err.field,
        }
    }
}

/// A builder field was read before it was set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{rule}: `{field}` has not been set prior to retrieval")]
pub struct StateError {
    pub rule: RuleRef,
    pub field: &'static str,
}

/// Writing a discovery document to its sink failed.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to write discovery document: {0}")]
    Io(#[from] std::io::Error),
}
