//! FAIR Draft Generation Layer
//!
//! Implementations of the `DraftGenerator` trait from `fair-domain`, and the
//! prompt builder that puts retrieved evidence in front of the model.
//!
//! # Generators
//!
//! - [`MockGenerator`]: deterministic canned responses for testing
//! - [`OllamaGenerator`]: local Ollama API integration
//!
//! A generator is passed to the pipeline with every request; there is no
//! process-wide "current model".
//!
//! # Examples
//!
//! ```
//! use fair_domain::traits::DraftGenerator;
//! use fair_llm::MockGenerator;
//!
//! let generator = MockGenerator::new("Diversification reduces risk [Source 1].");
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let draft = runtime.block_on(generator.generate("any prompt")).unwrap();
//! assert_eq!(draft, "Diversification reduces risk [Source 1].");
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod prompt;

pub use mock::MockGenerator;
pub use ollama::{OllamaConfig, OllamaGenerator};
pub use prompt::EvidencePromptBuilder;

use thiserror::Error;

/// Errors that can occur during draft generation
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the backend
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available on the backend
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The HTTP client could not be built
    #[error("Client configuration error: {0}")]
    Client(String),

    /// Generic error
    #[error("Generation error: {0}")]
    Other(String),
}
