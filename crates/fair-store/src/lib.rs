//! FAIR Storage Layer
//!
//! The evidence store: a read-only catalog of curated and dataset-derived
//! evidence items with precomputed embeddings, the corpus import path that
//! builds it, a SQLite snapshot for persistence, and the query embedding cache.
//!
//! # Architecture
//!
//! - [`EvidenceCatalog`] implements `fair_domain::traits::EvidenceStore` and is
//!   immutable once built, so it can be shared across concurrent queries
//! - Corpus updates go through [`corpus::CorpusImporter`] or
//!   [`SqliteEvidenceStore`], which produce a fresh catalog
//! - Malformed items are skipped and logged, never fatal

#![warn(missing_docs)]

pub mod cache;
pub mod catalog;
pub mod corpus;
pub mod embedding;
pub mod sqlite;

pub use cache::QueryEmbeddingCache;
pub use catalog::{CatalogBuild, EvidenceCatalog, SkippedItem};
pub use corpus::{CorpusImporter, CorpusRecord, ParsedCorpus, QaPair};
pub use embedding::{cosine_similarity, EmbeddingError, EmbeddingModel, HashingEmbeddingModel};
pub use sqlite::SqliteEvidenceStore;

use thiserror::Error;

/// Store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Corpus JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Corpus file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding computation failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// An evidence item is missing a required field or has an invalid value
    #[error("Malformed corpus item '{id}': {reason}")]
    MalformedItem {
        /// Source id, or `<missing>`
        id: String,
        /// What was wrong
        reason: String,
    },
}
