//! Hybrid semantic and keyword retrieval

use crate::config::RetrieverConfig;
use crate::error::RetrievalError;
use crate::keyword::keyword_overlap;
use crate::threshold::dynamic_threshold;
use fair_domain::text::terms;
use fair_domain::traits::EvidenceStore;
use fair_domain::{Domain, EvidenceItem, RetrievalMethod, RetrievalResult, RetrievedEvidence};
use fair_store::{cosine_similarity, EmbeddingModel, HashingEmbeddingModel, QueryEmbeddingCache};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tolerance when comparing a similarity against the dynamic threshold
const THRESHOLD_EPSILON: f64 = 1e-12;

/// Evidence retriever over a shared, read-only store
///
/// Safe to share across threads: the store is immutable and the query cache
/// is internally synchronized.
pub struct EvidenceRetriever<S: EvidenceStore, M: EmbeddingModel = HashingEmbeddingModel> {
    store: Arc<S>,
    model: M,
    cache: QueryEmbeddingCache,
    config: RetrieverConfig,
}

/// A candidate scored by the semantic pass
struct Scored {
    item: Arc<EvidenceItem>,
    similarity: f64,
}

impl<S: EvidenceStore, M: EmbeddingModel> EvidenceRetriever<S, M> {
    /// Create a retriever
    pub fn new(store: Arc<S>, model: M, config: RetrieverConfig) -> Self {
        let cache = QueryEmbeddingCache::new(config.embedding_cache_capacity);
        Self {
            store,
            model,
            cache,
            config,
        }
    }

    /// Retriever configuration
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Embedding model used for queries
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Number of cached query embeddings
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Retrieve up to `top_k` items for `query` within `domain`
    pub fn retrieve(
        &self,
        query: &str,
        domain: Domain,
        top_k: usize,
    ) -> Result<RetrievalResult, RetrievalError> {
        self.retrieve_with_deadline(query, domain, top_k, None)
    }

    /// Retrieve, giving up with [`RetrievalError::DeadlineExceeded`] once
    /// `deadline` has passed
    ///
    /// The deadline is checked before scanning and every
    /// `deadline_check_interval` items during the scan.
    pub fn retrieve_with_deadline(
        &self,
        query: &str,
        domain: Domain,
        top_k: usize,
        deadline: Option<Instant>,
    ) -> Result<RetrievalResult, RetrievalError> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(RetrievalResult::empty(query, domain));
        }

        let candidates = self.store.candidates(domain);
        if candidates.is_empty() {
            debug!(domain = %domain, "No candidates in domain");
            return Ok(RetrievalResult::empty(query, domain));
        }

        check_deadline(deadline, 0)?;

        let query_embedding = self
            .cache
            .get_or_try_insert(query, || self.model.embed(query))?;

        let mut scored = self.score(&query_embedding, candidates.iter(), deadline)?;
        scored.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });

        let mut items = self.semantic_pass(&scored, top_k);
        let semantic = items.len();

        if items.len() < top_k && self.config.keyword_fallback {
            let selected: HashSet<_> = items.iter().map(|e| e.item.id.clone()).collect();
            let remaining = top_k - items.len();
            items.extend(keyword_pass(query, &candidates, &selected, remaining));
        }

        info!(
            domain = %domain,
            candidates = candidates.len(),
            semantic,
            keyword = items.len() - semantic,
            "Retrieved evidence"
        );

        Ok(RetrievalResult {
            query: query.to_string(),
            domain,
            items,
        })
    }

    /// Cosine similarity of every candidate, deduplicated by id
    fn score<'a>(
        &self,
        query_embedding: &[f32],
        candidates: impl Iterator<Item = &'a Arc<EvidenceItem>>,
        deadline: Option<Instant>,
    ) -> Result<Vec<Scored>, RetrievalError> {
        let mut seen = HashSet::new();
        let mut scored = Vec::new();
        let interval = self.config.deadline_check_interval.max(1);

        for (scanned, item) in candidates.enumerate() {
            if scanned > 0 && scanned % interval == 0 {
                check_deadline(deadline, scanned)?;
            }
            if item.embedding.len() != query_embedding.len() {
                warn!(
                    source_id = %item.id,
                    item_dimension = item.embedding.len(),
                    query_dimension = query_embedding.len(),
                    "Skipping item with mismatched embedding dimension"
                );
                continue;
            }
            if !seen.insert(item.id.clone()) {
                continue;
            }
            scored.push(Scored {
                item: Arc::clone(item),
                similarity: f64::from(cosine_similarity(query_embedding, &item.embedding)),
            });
        }

        Ok(scored)
    }

    /// Items clearing both the dynamic threshold and `min_similarity`
    fn semantic_pass(&self, scored: &[Scored], top_k: usize) -> Vec<RetrievedEvidence> {
        let similarities: Vec<f64> = scored.iter().map(|s| s.similarity).collect();
        let Some(threshold) = dynamic_threshold(
            &similarities,
            self.config.threshold_window,
            self.config.similarity_floor_stddev_multiplier,
        ) else {
            return Vec::new();
        };

        debug!(threshold, best = similarities[0], "Computed similarity threshold");

        scored
            .iter()
            .filter(|s| s.similarity >= threshold - THRESHOLD_EPSILON)
            .filter(|s| s.similarity > self.config.min_similarity)
            .take(top_k)
            .map(|s| RetrievedEvidence {
                item: Arc::clone(&s.item),
                similarity: s.similarity,
                method: RetrievalMethod::Semantic,
            })
            .collect()
    }
}

/// Unselected candidates ranked by keyword overlap with the query
fn keyword_pass(
    query: &str,
    candidates: &[Arc<EvidenceItem>],
    selected: &HashSet<fair_domain::SourceId>,
    limit: usize,
) -> Vec<RetrievedEvidence> {
    let query_terms = terms(query);
    if query_terms.is_empty() {
        return Vec::new();
    }

    let mut seen = selected.clone();
    let mut hits: Vec<(usize, &Arc<EvidenceItem>)> = candidates
        .iter()
        .filter(|item| seen.insert(item.id.clone()))
        .map(|item| (keyword_overlap(&query_terms, item), item))
        .filter(|(overlap, _)| *overlap > 0)
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

    hits.into_iter()
        .take(limit)
        .map(|(overlap, item)| RetrievedEvidence {
            item: Arc::clone(item),
            similarity: overlap as f64 / query_terms.len() as f64,
            method: RetrievalMethod::Keyword,
        })
        .collect()
}

fn check_deadline(deadline: Option<Instant>, scanned: usize) -> Result<(), RetrievalError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => {
            warn!(scanned, "Retrieval deadline exceeded");
            Err(RetrievalError::DeadlineExceeded { scanned })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fair_store::corpus::builtin_catalog;
    use fair_store::{CorpusRecord, EmbeddingError, EvidenceCatalog};
    use fair_domain::{SourceId, SourceOrigin, SourceType};

    fn curated_retriever(config: RetrieverConfig) -> EvidenceRetriever<EvidenceCatalog> {
        let model = HashingEmbeddingModel::default();
        let catalog = builtin_catalog(&model, Vec::new()).unwrap().catalog;
        EvidenceRetriever::new(Arc::new(catalog), model, config)
    }

    /// Embeds every query as a fixed vector
    struct FixedModel(Vec<f32>);

    impl EmbeddingModel for FixedModel {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.0.clone())
        }

        fn dimension(&self) -> usize {
            self.0.len()
        }
    }

    fn record(id: &str, embedding: Vec<f32>, keywords: &[&str]) -> CorpusRecord {
        CorpusRecord {
            id: id.to_string(),
            title: format!("Item {id}"),
            content: "Finance content".to_string(),
            domain: Some("finance".to_string()),
            reliability: Some(0.9),
            publication_date: None,
            source_type: SourceType::Educational,
            origin: SourceOrigin::Curated,
            url: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            embedding: Some(embedding),
        }
    }

    fn fixed_retriever(
        query: Vec<f32>,
        records: Vec<CorpusRecord>,
        config: RetrieverConfig,
    ) -> EvidenceRetriever<EvidenceCatalog, FixedModel> {
        let build = EvidenceCatalog::build(query.len(), records);
        EvidenceRetriever::new(Arc::new(build.catalog), FixedModel(query), config)
    }

    #[test]
    fn test_retrieves_relevant_finance_item() {
        let retriever = curated_retriever(RetrieverConfig::default());
        let result = retriever
            .retrieve("How do interest rates affect bond prices?", Domain::Finance, 3)
            .unwrap();

        assert!(!result.is_empty());
        assert!(result.len() <= 3);
        assert_eq!(result.items[0].item.id.as_str(), "fin_002");
        assert_eq!(result.items[0].method, RetrievalMethod::Semantic);
        assert!(result.iter().all(|e| e.item.domain == Domain::Finance));
    }

    #[test]
    fn test_ranked_by_similarity_then_id() {
        let retriever = fixed_retriever(
            vec![1.0, 0.0],
            vec![
                record("fin_b", vec![1.0, 0.0], &[]),
                record("fin_a", vec![1.0, 0.0], &[]),
                record("fin_c", vec![0.9, 0.1], &[]),
            ],
            RetrieverConfig::default(),
        );
        let result = retriever.retrieve("anything", Domain::Finance, 3).unwrap();
        let ids: Vec<&str> = result.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids[..2], ["fin_a", "fin_b"]);
    }

    #[test]
    fn test_threshold_drops_weak_matches() {
        let retriever = fixed_retriever(
            vec![1.0, 0.0],
            vec![
                record("fin_001", vec![1.0, 0.0], &[]),
                record("fin_002", vec![0.95, 0.05], &[]),
                record("fin_003", vec![0.05, 1.0], &[]),
            ],
            RetrieverConfig {
                keyword_fallback: false,
                ..RetrieverConfig::default()
            },
        );
        let result = retriever.retrieve("anything", Domain::Finance, 3).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.rank_of(&SourceId::new("fin_003")).is_none());
    }

    #[test]
    fn test_keyword_fallback_tops_up() {
        let retriever = curated_retriever(RetrieverConfig {
            min_similarity: 0.99,
            ..RetrieverConfig::default()
        });
        let result = retriever
            .retrieve("bond duration and interest", Domain::Finance, 3)
            .unwrap();

        assert!(!result.is_empty());
        assert_eq!(result.count_by(RetrievalMethod::Semantic), 0);
        let first = &result.items[0];
        assert_eq!(first.item.id.as_str(), "fin_002");
        assert_eq!(first.method, RetrievalMethod::Keyword);
        assert!(first.similarity > 0.0 && first.similarity <= 1.0);
    }

    #[test]
    fn test_no_fallback_when_disabled() {
        let retriever = curated_retriever(RetrieverConfig {
            min_similarity: 0.99,
            keyword_fallback: false,
            ..RetrieverConfig::default()
        });
        let result = retriever
            .retrieve("bond duration and interest", Domain::Finance, 3)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_domain_and_empty_query() {
        let retriever = fixed_retriever(
            vec![1.0, 0.0],
            vec![record("fin_001", vec![1.0, 0.0], &["bond"])],
            RetrieverConfig::default(),
        );
        assert!(retriever.retrieve("bond", Domain::Medical, 3).unwrap().is_empty());
        assert!(retriever.retrieve("   ", Domain::Finance, 3).unwrap().is_empty());
        assert!(retriever.retrieve("bond", Domain::Finance, 0).unwrap().is_empty());
    }

    #[test]
    fn test_stop_word_query_finds_nothing() {
        let retriever = curated_retriever(RetrieverConfig::default());
        let result = retriever.retrieve("what is it?", Domain::Medical, 3).unwrap();
        assert!(result.is_empty());
        assert!(result.require_evidence().is_err());
    }

    #[test]
    fn test_general_domain_searches_everything() {
        let retriever = curated_retriever(RetrieverConfig::default());
        let result = retriever
            .retrieve("suicide crisis lifeline support", Domain::General, 3)
            .unwrap();
        assert_eq!(result.items[0].item.id.as_str(), "med_004");
    }

    #[test]
    fn test_deadline_exceeded() {
        let retriever = curated_retriever(RetrieverConfig::default());
        let err = retriever
            .retrieve_with_deadline("bond prices", Domain::Finance, 3, Some(Instant::now()))
            .unwrap_err();
        assert!(matches!(err, RetrievalError::DeadlineExceeded { scanned: 0 }));
    }

    #[test]
    fn test_zero_check_interval_checks_every_item() {
        let retriever = curated_retriever(RetrieverConfig {
            deadline_check_interval: 0,
            ..RetrieverConfig::default()
        });
        let result = retriever
            .retrieve("How do interest rates affect bond prices?", Domain::Finance, 3)
            .unwrap();
        assert_eq!(result.items[0].item.id.as_str(), "fin_002");

        let far = Instant::now() + std::time::Duration::from_secs(60);
        assert!(retriever
            .retrieve_with_deadline("aspirin bleeding risk", Domain::Medical, 3, Some(far))
            .is_ok());
    }

    #[test]
    fn test_repeated_query_is_idempotent() {
        let retriever = curated_retriever(RetrieverConfig::default());
        let first = retriever.retrieve("diabetes metformin", Domain::Medical, 3).unwrap();
        let second = retriever.retrieve("diabetes metformin", Domain::Medical, 3).unwrap();

        assert_eq!(first.ids(), second.ids());
        let sims = |r: &RetrievalResult| r.iter().map(|e| e.similarity).collect::<Vec<_>>();
        assert_eq!(sims(&first), sims(&second));
        assert_eq!(retriever.cache_len(), 1);
    }
}
