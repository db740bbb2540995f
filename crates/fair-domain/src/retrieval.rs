//! Retrieval results

use crate::{Domain, EvidenceItem, SourceId};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// How an item made it into a retrieval result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    /// Cleared the dynamic similarity threshold
    Semantic,
    /// Added by the keyword-overlap fallback
    Keyword,
}

/// One ranked entry of a retrieval result
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedEvidence {
    /// Shared reference into the evidence store
    pub item: Arc<EvidenceItem>,
    /// Cosine similarity for semantic hits, normalized overlap for keyword hits
    pub similarity: f64,
    /// Retrieval method tag
    pub method: RetrievalMethod,
}

/// Ranked, deduplicated evidence for one query
///
/// Produced per request and owned by the caller; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    /// Query text the result was computed for
    pub query: String,
    /// Domain the retrieval was scoped to
    pub domain: Domain,
    /// Entries in rank order (best first)
    pub items: Vec<RetrievedEvidence>,
}

/// Retrieval found nothing after both the semantic and keyword passes
///
/// An expected outcome: callers answer with an explicit refusal instead of an
/// unsupported answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {domain} evidence found for query '{query}'")]
pub struct NoEvidenceFound {
    /// The query that produced no evidence
    pub query: String,
    /// Domain the retrieval was scoped to
    pub domain: Domain,
}

impl RetrievalResult {
    /// An empty result
    pub fn empty(query: impl Into<String>, domain: Domain) -> Self {
        Self {
            query: query.into(),
            domain,
            items: Vec::new(),
        }
    }

    /// Number of retrieved items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing was retrieved
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate entries in rank order
    pub fn iter(&self) -> impl Iterator<Item = &RetrievedEvidence> {
        self.items.iter()
    }

    /// Source ids in rank order
    pub fn ids(&self) -> Vec<&SourceId> {
        self.items.iter().map(|e| &e.item.id).collect()
    }

    /// 1-based rank of a source, as used in `[Source N]` citation markers
    pub fn rank_of(&self, id: &SourceId) -> Option<usize> {
        self.items
            .iter()
            .position(|e| &e.item.id == id)
            .map(|idx| idx + 1)
    }

    /// Number of entries tagged with `method`
    pub fn count_by(&self, method: RetrievalMethod) -> usize {
        self.items.iter().filter(|e| e.method == method).count()
    }

    /// Turn an empty result into [`NoEvidenceFound`]
    pub fn require_evidence(self) -> Result<Self, NoEvidenceFound> {
        if self.items.is_empty() {
            return Err(NoEvidenceFound {
                query: self.query,
                domain: self.domain,
            });
        }
        Ok(self)
    }
}
