//! Trait definitions for external capabilities
//!
//! These traits define the boundaries between the scoring core and
//! infrastructure. Implementations live in other crates.

use crate::{Domain, EvidenceItem, ExternalItem, RiskTags, SourceId};
use std::future::Future;
use std::sync::Arc;

/// Read-only, domain-tagged evidence collection
///
/// Implemented by the storage layer (fair-store). Shared across concurrent
/// queries without locking; corpus updates go through a separate
/// maintenance path that produces a new store.
pub trait EvidenceStore {
    /// Items tagged with `domain`; `Domain::General` yields the full corpus
    fn candidates(&self, domain: Domain) -> Vec<Arc<EvidenceItem>>;

    /// Look up one item
    fn get(&self, id: &SourceId) -> Option<Arc<EvidenceItem>>;

    /// Number of items
    fn len(&self) -> usize;

    /// True when the store holds no items
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Detects risk categories in text
///
/// Implemented by the enhancement layer (fair-enhancer). The matching
/// strategy (keywords, classifier, rules engine) is the implementor's choice.
pub trait RiskClassifier {
    /// Classify `text`
    fn classify(&self, text: &str) -> RiskTags;
}

/// Produces the unstructured draft answer for a prompt
///
/// Implemented by the generation layer (fair-llm). A generator is passed
/// explicitly with each request, so concurrent queries can use different
/// backends.
pub trait DraftGenerator {
    /// Error type for generation
    type Error: std::fmt::Display;

    /// Backend name recorded in reports
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Searches sources outside the local corpus
///
/// Optional; when absent the external enhancement is a no-op.
pub trait ExternalSearch {
    /// Search for up to `limit` items relevant to `query`
    fn search(&self, query: &str, domain: Domain, limit: usize) -> Result<Vec<ExternalItem>, String>;
}
