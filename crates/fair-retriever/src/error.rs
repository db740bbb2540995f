//! Error types for retrieval

use fair_store::EmbeddingError;
use thiserror::Error;

/// Errors that can occur during retrieval
///
/// An empty result is not an error; see `RetrievalResult::require_evidence`.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The caller's deadline passed before retrieval finished
    #[error("Retrieval deadline exceeded after scanning {scanned} items")]
    DeadlineExceeded {
        /// Items scored before the deadline check failed
        scanned: usize,
    },

    /// The query could not be embedded
    #[error("Query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}
