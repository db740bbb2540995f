//! Query embedding cache
//!
//! Keyed by exact query text. The cache only saves vector computation; the
//! retriever always recomputes similarity against the current corpus.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Default maximum number of cached queries
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Thread-safe, append-only map from query text to embedding
///
/// Entries are never replaced or evicted; once full, new queries are simply
/// not cached. A poisoned lock is recovered since the map is never left
/// half-written.
#[derive(Debug)]
pub struct QueryEmbeddingCache {
    entries: RwLock<HashMap<String, Arc<[f32]>>>,
    capacity: usize,
}

impl QueryEmbeddingCache {
    /// Create a cache holding at most `capacity` queries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Cached embedding for `query`
    pub fn get(&self, query: &str) -> Option<Arc<[f32]>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
            .cloned()
    }

    /// Return the cached embedding or compute, cache and return it
    ///
    /// `compute` runs outside the lock. If two threads race on the same query
    /// the first insert wins and both get that value.
    pub fn get_or_try_insert<E>(
        &self,
        query: &str,
        compute: impl FnOnce() -> Result<Vec<f32>, E>,
    ) -> Result<Arc<[f32]>, E> {
        if let Some(hit) = self.get(query) {
            return Ok(hit);
        }

        let computed: Arc<[f32]> = compute()?.into();

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(query) {
            return Ok(Arc::clone(existing));
        }
        if entries.len() < self.capacity {
            entries.insert(query.to_string(), Arc::clone(&computed));
        }
        Ok(computed)
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryEmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
