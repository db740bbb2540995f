//! Error types for the pipeline

use fair_retriever::RetrievalError;
use thiserror::Error;

/// Errors that can occur while answering a query
///
/// Finding no evidence is not an error; it yields
/// [`Outcome::InsufficientEvidence`](crate::Outcome::InsufficientEvidence).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Retrieval failed or ran past its deadline
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Draft generator error
    #[error("Generation error: {0}")]
    Generation(String),

    /// Draft generation did not finish in time
    #[error("Generation timeout after {0}s")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
