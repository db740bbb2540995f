//! Embedding model for text vectorization
//!
//! Evidence items and queries must live in the same embedding space. The
//! default model is a deterministic feature-hashing bag of words: every
//! meaningful term (and every adjacent pair of terms) is hashed into a signed
//! bucket with a log-scaled term frequency, and the vector is L2-normalized.
//! Texts that share vocabulary end up close under cosine similarity, and no
//! model files are needed.
//!
//! Buckets come from SHA-256, so vectors stored in a snapshot stay comparable
//! with query vectors computed by any later build.
//!
//! # Examples
//!
//! ```rust
//! use fair_store::embedding::{cosine_similarity, EmbeddingModel, HashingEmbeddingModel};
//!
//! let model = HashingEmbeddingModel::new(384);
//! let a = model.embed("bond prices fall when interest rates rise").unwrap();
//! let b = model.embed("rising interest rates and bond prices").unwrap();
//! let c = model.embed("metformin for type 2 diabetes").unwrap();
//! assert_eq!(a.len(), 384);
//! assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
//! ```

use fair_domain::text::term_sequence;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

/// Default embedding dimension
pub const DEFAULT_DIMENSION: usize = 384;

/// Weight of a bigram feature relative to a single term
const BIGRAM_WEIGHT: f32 = 0.5;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Trait for embedding models
pub trait EmbeddingModel: Send + Sync {
    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Get the dimension of embeddings produced by this model
    fn dimension(&self) -> usize;
}

/// Deterministic feature-hashing embedding model
///
/// Text without any meaningful term (only stop words or punctuation) maps to
/// the zero vector, which has similarity 0 with everything.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingModel {
    dimension: usize,
}

impl HashingEmbeddingModel {
    /// Create a model producing `dimension`-sized vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Bucket index and sign for one feature
    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(prefix);

        let index = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for HashingEmbeddingModel {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl EmbeddingModel for HashingEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let terms = term_sequence(text);
        let mut features: BTreeMap<String, f32> = BTreeMap::new();
        for term in &terms {
            *features.entry(term.clone()).or_default() += 1.0;
        }
        for pair in terms.windows(2) {
            *features.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1.0;
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for (feature, count) in &features {
            let (index, sign) = self.bucket(feature);
            let weight = if feature.contains(' ') { BIGRAM_WEIGHT } else { 1.0 };
            embedding[index] += sign * weight * (1.0 + count.ln());
        }

        // Normalize to unit length for cosine similarity
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1]; 0 when the lengths differ or either vector
/// has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
