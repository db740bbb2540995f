//! Configuration for the retriever

use fair_store::cache::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Configuration for hybrid retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Items returned when the caller does not ask for a specific count
    pub top_k: usize,

    /// How many of the best similarities feed the dynamic threshold
    pub threshold_window: usize,

    /// `k` in `threshold = mean - k * stddev`
    pub similarity_floor_stddev_multiplier: f64,

    /// Semantic hits must score strictly above this
    pub min_similarity: f64,

    /// Top up short semantic results by keyword overlap
    pub keyword_fallback: bool,

    /// Maximum number of cached query embeddings
    pub embedding_cache_capacity: usize,

    /// Items scanned between deadline checks; 0 checks after every item
    pub deadline_check_interval: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold_window: 5,
            similarity_floor_stddev_multiplier: 0.5,
            min_similarity: 0.0,
            keyword_fallback: true,
            embedding_cache_capacity: DEFAULT_CACHE_CAPACITY,
            deadline_check_interval: 256,
        }
    }
}

impl RetrieverConfig {
    /// Semantic only, wider threshold window
    pub fn strict() -> Self {
        Self {
            keyword_fallback: false,
            min_similarity: 0.05,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.threshold_window == 0 {
            return Err("threshold_window must be greater than 0".to_string());
        }
        if !self.similarity_floor_stddev_multiplier.is_finite()
            || self.similarity_floor_stddev_multiplier < 0.0
        {
            return Err("similarity_floor_stddev_multiplier must be non-negative".to_string());
        }
        if !(-1.0..1.0).contains(&self.min_similarity) {
            return Err("min_similarity must be in [-1, 1)".to_string());
        }
        if self.deadline_check_interval == 0 {
            return Err("deadline_check_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}
