//! Bridges request paths to discovery documents.

use std::io::Write;
use std::sync::Arc;

use crate::discovery::error::SerializationError;
use crate::discovery::rule_set::RuleSet;
use crate::discovery::writer::DocumentWriter;

/// Content type of a served discovery document.
pub const CONTENT_TYPE: &str = "application/xrds+xml";

/// What the responder did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A document was written; respond `200` with [`CONTENT_TYPE`].
    Handled,
    /// Nothing matched. Nothing was written; the transport decides.
    Declined,
}

/// Resolves paths against a shared [`RuleSet`] and writes the document.
#[derive(Debug, Clone)]
pub struct DiscoveryResponder {
    rules: Arc<RuleSet>,
    writer: DocumentWriter,
}

impl DiscoveryResponder {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self::with_writer(rules, DocumentWriter::new())
    }

    pub fn with_writer(rules: Arc<RuleSet>, writer: DocumentWriter) -> Self {
        Self { rules, writer }
    }

    /// Handle `path`, writing the document to `sink` when anything matches.
    pub fn respond<W: Write>(&self, path: &str, sink: W) -> Result<Disposition, SerializationError> {
        let result = self.rules.resolve(path);
        if result.is_empty() {
            tracing::debug!(path = %path, "No discovery rule matched");
            return Ok(Disposition::Declined);
        }

        tracing::debug!(
            path = %path,
            services = result.services().len(),
            canonical_id = result.canonical_id().map(|c| c.canonical_id()),
            "Serving discovery document"
        );

        self.writer.write(&result, sink)?;
        Ok(Disposition::Handled)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}
