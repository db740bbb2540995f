//! Integration tests for the end-to-end pipeline

use fair_domain::traits::DraftGenerator;
use fair_domain::{Domain, RetrievalMethod};
use fair_llm::{GenerationError, MockGenerator};
use fair_pipeline::{
    AnswerRequest, Outcome, PipelineConfig, PipelineError, RefusalReason, TrustPipeline,
};
use fair_store::corpus::builtin_catalog;
use fair_store::{EvidenceCatalog, HashingEmbeddingModel};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pipeline(config: PipelineConfig) -> TrustPipeline<EvidenceCatalog> {
    init_tracing();
    let model = HashingEmbeddingModel::default();
    let catalog = builtin_catalog(&model, Vec::new())
        .unwrap()
        .into_strict()
        .unwrap();
    TrustPipeline::new(Arc::new(catalog), model, config).unwrap()
}

/// Generator that never answers within the test's timeout
struct SlowGenerator;

impl DraftGenerator for SlowGenerator {
    type Error = GenerationError;

    fn name(&self) -> &str {
        "slow"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

#[tokio::test]
async fn test_medical_answer_is_enhanced_and_scored() {
    let pipeline = pipeline(PipelineConfig::default());
    let generator = MockGenerator::new(
        "Hypertension is diagnosed when blood pressure readings stay at or above 130/80 mmHg \
         [Source 1]. Treatment may include lifestyle changes and medication.",
    );

    let outcome = pipeline
        .answer(
            AnswerRequest::new("What blood pressure counts as hypertension?"),
            &generator,
        )
        .await
        .unwrap();
    let report = outcome.report().expect("answered");

    assert_eq!(report.domain, Domain::Medical);
    assert_eq!(report.retrieval.items[0].method, RetrievalMethod::Semantic);
    assert!(report.outcomes.safety.applied);
    assert!(report.text.contains("MEDICAL DISCLAIMER"));
    assert!(report.outcomes.evidence.applied);
    assert!(report.text.contains("**Sources:**"));
    // unstructured draft gets rebuilt
    assert!(report.outcomes.reasoning.applied);
    assert!(report.text.starts_with("**Problem:**"));

    assert!(report.final_confidence() <= 0.85);
    assert!(report.evidence_coverage > 0.0);
    assert!((0.0..=1.0).contains(&report.metrics.hallucination_reduction));
    assert_eq!(
        report.metrics.faithfulness,
        report.base_scores.faithfulness + report.outcomes.evidence.boost
    );
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let pipeline = pipeline(PipelineConfig::default());
    let generator = MockGenerator::new("Bond prices fall when interest rates rise [Source 1].");

    let outcome = pipeline
        .answer(
            AnswerRequest::new("How do interest rates affect bond prices?").with_domain(Domain::Finance),
            &generator,
        )
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    assert_eq!(value["status"], "answered");
    assert_eq!(value["domain"], "finance");
    assert_eq!(value["generator"], "mock");
    assert!(value["confidence"]["final_confidence"].is_number());
    assert!(value["metrics"]["calibration_error"].is_number());
    assert!(value["retrieval"]["items"][0]["item"]["id"].is_string());
    // embeddings are never serialized
    assert!(value["retrieval"]["items"][0]["item"].get("embedding").is_none());
}

#[tokio::test]
async fn test_unclassified_query_uses_lower_ceiling() {
    let pipeline = pipeline(PipelineConfig::default());
    let generator = MockGenerator::new(
        "If you are thinking about suicide, call or text 988 to reach the crisis lifeline [Source 1].",
    );

    let outcome = pipeline
        .answer(AnswerRequest::new("suicide crisis lifeline support"), &generator)
        .await
        .unwrap();
    let report = outcome.report().expect("answered");

    assert_eq!(report.domain, Domain::General);
    assert_eq!(report.confidence.ceiling, 0.70);
    assert!(report.final_confidence() <= 0.70);
    assert!(report.text.contains("CRISIS RESOURCES"));
}

#[tokio::test]
async fn test_concurrent_queries_use_their_own_generators() {
    let pipeline = Arc::new(pipeline(PipelineConfig::default()));
    let finance = MockGenerator::new("Diversification spreads risk across assets [Source 1].")
        .with_name("finance-model");
    let medical = MockGenerator::new("Metformin is a common first medication [Source 1].")
        .with_name("medical-model");

    let (a, b) = tokio::join!(
        pipeline.answer(
            AnswerRequest::new("Why diversify an investment portfolio?").with_domain(Domain::Finance),
            &finance,
        ),
        pipeline.answer(
            AnswerRequest::new("How is diabetes treated with metformin?").with_domain(Domain::Medical),
            &medical,
        ),
    );

    assert_eq!(a.unwrap().report().unwrap().generator, "finance-model");
    assert_eq!(b.unwrap().report().unwrap().generator, "medical-model");
    assert_eq!(finance.call_count(), 1);
    assert_eq!(medical.call_count(), 1);
}

#[tokio::test]
async fn test_generation_timeout() {
    let config = PipelineConfig {
        generation_timeout_secs: 1,
        ..PipelineConfig::default()
    };
    let pipeline = pipeline(config);

    let result = pipeline
        .answer(
            AnswerRequest::new("How do interest rates affect bond prices?").with_domain(Domain::Finance),
            &SlowGenerator,
        )
        .await;

    assert!(matches!(result, Err(PipelineError::Timeout(1))));
}

#[tokio::test]
async fn test_config_loaded_from_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
require_evidence = true
retrieval_timeout_ms = 500

[retriever]
top_k = 1

[enhancer]
citation_style = "apa"
"#
    )
    .unwrap();

    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.retriever.top_k, 1);

    let pipeline = pipeline(config);
    let generator = MockGenerator::new("Bond prices fall when interest rates rise [Source 1].");
    let outcome = pipeline
        .answer(
            AnswerRequest::new("How do interest rates affect bond prices?").with_domain(Domain::Finance),
            &generator,
        )
        .await
        .unwrap();

    let report = outcome.report().expect("answered");
    assert_eq!(report.retrieval.len(), 1);
}

#[test]
fn test_invalid_config_file_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[retriever]\ntop_k = 0").unwrap();

    let result = PipelineConfig::load(file.path());
    assert!(matches!(result, Err(PipelineError::Config(_))));
}

#[tokio::test]
async fn test_refusal_is_not_an_error() {
    init_tracing();
    let model = HashingEmbeddingModel::default();
    let catalog = EvidenceCatalog::empty(384);
    let pipeline = TrustPipeline::new(Arc::new(catalog), model, PipelineConfig::default()).unwrap();
    let generator = MockGenerator::default();

    let outcome = pipeline
        .answer(
            AnswerRequest::new("What dosage of ibuprofen is safe?").with_domain(Domain::Medical),
            &generator,
        )
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::InsufficientEvidence(_)));
    assert!(outcome.text().contains("medical"));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_draft_ignoring_retrieved_evidence_is_refused() {
    let pipeline = pipeline(PipelineConfig::default());
    let generator = MockGenerator::new("It depends on your goals.");

    let outcome = pipeline
        .answer(
            AnswerRequest::new("How do interest rates affect bond prices?").with_domain(Domain::Finance),
            &generator,
        )
        .await
        .unwrap();

    assert!(matches!(
        &outcome,
        Outcome::InsufficientEvidence(refusal) if refusal.reason == RefusalReason::UncitedDraft
    ));
    assert_eq!(outcome.confidence(), 0.0);

    let value: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    assert_eq!(value["status"], "insufficient_evidence");
    assert_eq!(value["reason"], "uncited_draft");
}
