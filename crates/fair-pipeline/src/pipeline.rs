//! End-to-end answer pipeline

use crate::base::{base_confidence, base_scores};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::report::{AnswerRequest, Outcome, Refusal, TrustReport};
use fair_domain::traits::{DraftGenerator, EvidenceStore, RiskClassifier};
use fair_domain::{calibrate, evaluate, Domain, ReportId};
use fair_enhancer::{EnhancementComposer, KeywordRiskClassifier};
use fair_llm::EvidencePromptBuilder;
use fair_retriever::{evidence_coverage, EvidenceRetriever};
use fair_store::{EmbeddingModel, HashingEmbeddingModel};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Retrieves evidence, generates and enhances a draft, and scores it
///
/// Holds no per-query state: one pipeline serves concurrent queries, each
/// with its own generator.
pub struct TrustPipeline<S, M = HashingEmbeddingModel, C = KeywordRiskClassifier>
where
    S: EvidenceStore,
    M: EmbeddingModel,
    C: RiskClassifier,
{
    retriever: EvidenceRetriever<S, M>,
    composer: EnhancementComposer<C>,
    prompts: EvidencePromptBuilder,
    config: PipelineConfig,
}

impl<S, M> TrustPipeline<S, M, KeywordRiskClassifier>
where
    S: EvidenceStore,
    M: EmbeddingModel,
{
    /// Create a pipeline with the keyword risk classifier
    pub fn new(store: Arc<S>, model: M, config: PipelineConfig) -> Result<Self, PipelineError> {
        let composer = EnhancementComposer::new(config.enhancer.clone())
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Self::with_composer(store, model, composer, config)
    }
}

impl<S, M, C> TrustPipeline<S, M, C>
where
    S: EvidenceStore,
    M: EmbeddingModel,
    C: RiskClassifier,
{
    /// Create a pipeline around a prepared composer
    ///
    /// The composer keeps its own enhancer settings; `config.enhancer` is
    /// only validated. The composer's boost limits must match the trust
    /// configuration's.
    pub fn with_composer(
        store: Arc<S>,
        model: M,
        composer: EnhancementComposer<C>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        if composer.config().boost_limits != config.trust.boost_limits {
            return Err(PipelineError::Config(
                "composer boost_limits must match trust.boost_limits".to_string(),
            ));
        }
        Ok(Self {
            retriever: EvidenceRetriever::new(store, model, config.retriever.clone()),
            composer,
            prompts: EvidencePromptBuilder::default(),
            config,
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The evidence retriever
    pub fn retriever(&self) -> &EvidenceRetriever<S, M> {
        &self.retriever
    }

    /// Answer `request` with a draft from `generator`
    ///
    /// When evidence is required the outcome is [`Outcome::InsufficientEvidence`]
    /// if retrieval finds nothing (the generator is not called) or if the
    /// draft cites none of the retrieved items. Only drafts backed by cited
    /// evidence are scored.
    pub async fn answer<G>(&self, request: AnswerRequest, generator: &G) -> Result<Outcome, PipelineError>
    where
        G: DraftGenerator,
    {
        let query = request.query.trim();
        let domain = request.domain.unwrap_or_else(|| Domain::infer(query));
        let top_k = request.top_k.unwrap_or(self.config.retriever.top_k);

        info!(domain = %domain, top_k, generator = generator.name(), "Answering query");

        // Step 1: retrieve
        let deadline = Instant::now() + self.config.retrieval_timeout();
        let retrieval = self
            .retriever
            .retrieve_with_deadline(query, domain, top_k, Some(deadline))?;

        if retrieval.is_empty() && self.config.require_evidence {
            warn!(domain = %domain, "No evidence found; refusing to answer");
            return Ok(Outcome::InsufficientEvidence(Refusal::new(query, domain)));
        }

        // Step 2: draft
        let prompt = self.prompts.build(query, domain, &retrieval);
        debug!(chars = prompt.len(), "Built prompt");

        let draft = timeout(self.config.generation_timeout(), generator.generate(&prompt))
            .await
            .map_err(|_| PipelineError::Timeout(self.config.generation_timeout_secs))?
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        // Step 3: score the draft, then enhance it
        let base_confidence = base_confidence(&draft);
        let base_scores = base_scores(&draft, domain, &retrieval, self.retriever.model());
        let (text, outcomes) = self.composer.enhance(&draft, query, domain, &retrieval);

        if !outcomes.evidence.applied && !retrieval.is_empty() && self.config.require_evidence {
            warn!(
                domain = %domain,
                evidence = retrieval.len(),
                "Draft cites none of the retrieved evidence; refusing to answer"
            );
            return Ok(Outcome::InsufficientEvidence(Refusal::uncited(query, domain)));
        }

        // Step 4: calibrate and evaluate from the same snapshot
        let confidence = calibrate(base_confidence, &outcomes, domain, &self.config.trust);
        let metrics = evaluate(&base_scores, &outcomes, &confidence, &self.config.trust);
        let coverage = evidence_coverage(query, &retrieval);

        let report = TrustReport {
            id: ReportId::new(),
            query: query.to_string(),
            domain,
            generator: generator.name().to_string(),
            text,
            retrieval,
            outcomes,
            base_scores,
            confidence,
            metrics,
            evidence_coverage: coverage,
        };

        info!(
            id = %report.id,
            domain = %domain,
            evidence = report.retrieval.len(),
            confidence = report.final_confidence(),
            faithfulness = report.metrics.faithfulness,
            hallucination_reduction = report.metrics.hallucination_reduction,
            calibration_error = report.metrics.calibration_error,
            "Answered query"
        );

        Ok(Outcome::Answered(Box::new(report)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RefusalReason;
    use fair_llm::MockGenerator;
    use fair_store::{corpus::builtin_catalog, EvidenceCatalog};

    fn pipeline(config: PipelineConfig) -> TrustPipeline<EvidenceCatalog> {
        let model = HashingEmbeddingModel::default();
        let catalog = builtin_catalog(&model, Vec::new())
            .unwrap()
            .into_strict()
            .unwrap();
        TrustPipeline::new(Arc::new(catalog), model, config).unwrap()
    }

    #[tokio::test]
    async fn test_answer_reports_consistent_snapshot() {
        let pipeline = pipeline(PipelineConfig::default());
        let generator = MockGenerator::new(
            "Bond prices move inversely to interest rates [Source 1]. Longer maturities may carry more risk.",
        );

        let outcome = pipeline
            .answer(
                AnswerRequest::new("How do interest rates affect bond prices?"),
                &generator,
            )
            .await
            .unwrap();

        let report = outcome.report().expect("answered");
        assert_eq!(report.domain, Domain::Finance);
        assert_eq!(report.generator, "mock");
        assert!(!report.retrieval.is_empty());
        assert!(report.outcomes.evidence.applied);
        assert!(report.final_confidence() <= 0.85);
        assert!(report.final_confidence() >= report.confidence.base_confidence);
        assert_eq!(
            report.metrics.calibration_error,
            (report.final_confidence() - report.metrics.faithfulness).abs()
        );
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_domain_refuses_without_generating() {
        let model = HashingEmbeddingModel::default();
        let store = Arc::new(EvidenceCatalog::empty(model.dimension()));
        let pipeline = TrustPipeline::new(store, model, PipelineConfig::default()).unwrap();
        let generator = MockGenerator::default();

        let outcome = pipeline
            .answer(AnswerRequest::new("Is an index fund a good investment?"), &generator)
            .await
            .unwrap();

        assert!(outcome.is_refusal());
        assert_eq!(outcome.confidence(), 0.0);
        assert!(outcome.text().contains("financial"));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_evidence_optional_answers_anyway() {
        let model = HashingEmbeddingModel::default();
        let store = Arc::new(EvidenceCatalog::empty(model.dimension()));
        let pipeline = TrustPipeline::new(store, model, PipelineConfig::lenient()).unwrap();
        let generator = MockGenerator::new("It depends on your goals.");

        let outcome = pipeline
            .answer(AnswerRequest::new("Should I buy bonds?"), &generator)
            .await
            .unwrap();

        let report = outcome.report().expect("answered");
        assert!(report.retrieval.is_empty());
        assert_eq!(report.outcomes.evidence.boost, 0.0);
        assert_eq!(report.confidence.evidence_quality, 0.5);
    }

    #[tokio::test]
    async fn test_uncited_draft_is_refused() {
        let pipeline = pipeline(PipelineConfig::default());
        let generator = MockGenerator::new("It depends on your goals.");

        let outcome = pipeline
            .answer(
                AnswerRequest::new("How do interest rates affect bond prices?"),
                &generator,
            )
            .await
            .unwrap();

        match &outcome {
            Outcome::InsufficientEvidence(refusal) => {
                assert_eq!(refusal.reason, RefusalReason::UncitedDraft);
                assert_eq!(refusal.domain, Domain::Finance);
            }
            Outcome::Answered(_) => panic!("uncited draft was answered"),
        }
        assert_eq!(outcome.confidence(), 0.0);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_uncited_draft_answered_when_evidence_optional() {
        let pipeline = pipeline(PipelineConfig::lenient());
        let generator = MockGenerator::new("It depends on your goals.");

        let outcome = pipeline
            .answer(
                AnswerRequest::new("How do interest rates affect bond prices?"),
                &generator,
            )
            .await
            .unwrap();

        let report = outcome.report().expect("answered");
        assert!(!report.retrieval.is_empty());
        assert!(!report.outcomes.evidence.applied);
        assert_eq!(report.confidence.evidence_quality, 0.5);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let pipeline = pipeline(PipelineConfig::default());
        let generator = MockGenerator::default();
        generator.add_error("Question:");

        let result = pipeline
            .answer(AnswerRequest::new("What blood pressure counts as hypertension?"), &generator)
            .await;

        assert!(matches!(result, Err(PipelineError::Generation(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let model = HashingEmbeddingModel::default();
        let store = Arc::new(EvidenceCatalog::empty(model.dimension()));
        let mut config = PipelineConfig::default();
        config.trust.confidence_floor = -1.0;

        let result = TrustPipeline::new(store, model, config);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_composer_with_other_boost_limits_rejected() {
        let model = HashingEmbeddingModel::default();
        let store = Arc::new(EvidenceCatalog::empty(model.dimension()));
        let config = PipelineConfig::default();

        let mut enhancer = config.enhancer.clone();
        enhancer.boost_limits.evidence += 0.1;
        let composer = EnhancementComposer::new(enhancer).unwrap();

        let result = TrustPipeline::with_composer(store, model, composer, config);
        match result {
            Err(PipelineError::Config(message)) => assert!(message.contains("boost_limits")),
            _ => panic!("mismatched composer accepted"),
        }
    }
}
