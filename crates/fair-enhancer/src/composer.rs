//! Enhancement composer

use crate::classifier::KeywordRiskClassifier;
use crate::config::EnhancerConfig;
use crate::error::EnhanceError;
use crate::evidence::cited_evidence;
use crate::{evidence, external, reasoning, safety};
use fair_domain::traits::{ExternalSearch, RiskClassifier};
use fair_domain::{Domain, EnhancementKind, EnhancementOutcome, EnhancementOutcomes, RetrievalResult};
use std::sync::Arc;
use tracing::info;

/// Separator before the disclaimer block
const DISCLAIMER_RULE: &str = "\n\n---\n\n";

/// Runs the four enhancements over a draft answer
///
/// Boosts are computed from the draft and the evidence alone. Text is
/// produced in the order reasoning, evidence, external, safety, so the
/// disclaimers always end the answer.
pub struct EnhancementComposer<C: RiskClassifier = KeywordRiskClassifier> {
    config: EnhancerConfig,
    classifier: C,
    external: Option<Arc<dyn ExternalSearch + Send + Sync>>,
}

impl EnhancementComposer<KeywordRiskClassifier> {
    /// Composer with the built-in keyword classifier
    pub fn new(config: EnhancerConfig) -> Result<Self, EnhanceError> {
        Self::with_classifier(config, KeywordRiskClassifier::new()?)
    }
}

impl<C: RiskClassifier> EnhancementComposer<C> {
    /// Composer with a custom risk classifier
    pub fn with_classifier(config: EnhancerConfig, classifier: C) -> Result<Self, EnhanceError> {
        config.validate().map_err(EnhanceError::Config)?;
        Ok(Self {
            config,
            classifier,
            external: None,
        })
    }

    /// Enable the external search enhancement
    pub fn with_external_search(mut self, search: Arc<dyn ExternalSearch + Send + Sync>) -> Self {
        self.external = Some(search);
        self
    }

    /// Enhancer configuration
    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    /// Enhance `draft` and report what each enhancement contributed
    pub fn enhance(
        &self,
        draft: &str,
        query: &str,
        domain: Domain,
        retrieval: &RetrievalResult,
    ) -> (String, EnhancementOutcomes) {
        let cited = cited_evidence(draft, retrieval, self.config.min_keyword_overlap);

        let outcomes = EnhancementOutcomes {
            reasoning: reasoning::enhance(draft, query, domain, &cited, &self.config),
            evidence: evidence::enhance(draft, retrieval, &self.config),
            external: match &self.external {
                Some(search) => external::enhance(search.as_ref(), query, domain, &self.config),
                None => EnhancementOutcome::not_applied(EnhancementKind::External),
            },
            safety: safety::enhance(draft, query, domain, &self.classifier, &self.config),
        };

        let mut text = if outcomes.reasoning.applied {
            outcomes.reasoning.fragment.clone()
        } else {
            draft.trim_end().to_string()
        };
        for outcome in [&outcomes.evidence, &outcomes.external] {
            if outcome.applied {
                text.push_str("\n\n");
                text.push_str(&outcome.fragment);
            }
        }
        if outcomes.safety.applied {
            text.push_str(DISCLAIMER_RULE);
            text.push_str(&outcomes.safety.fragment);
        }

        info!(
            domain = %domain,
            cited = cited.len(),
            safety = outcomes.safety.boost,
            evidence = outcomes.evidence.boost,
            reasoning = outcomes.reasoning.boost,
            external = outcomes.external.boost,
            "Enhanced draft"
        );

        (text, outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fair_domain::{
        EvidenceItem, ExternalItem, RetrievalMethod, RetrievedEvidence, RiskTag, RiskTags,
        SourceId, SourceOrigin, SourceType,
    };

    fn medical_result() -> RetrievalResult {
        let item = EvidenceItem {
            id: SourceId::new("med_002"),
            title: "Diabetes Management Guidelines".to_string(),
            content: "Metformin is typically the first-line medication. Regular monitoring of HbA1c is essential.".to_string(),
            domain: Domain::Medical,
            reliability: 0.95,
            publication_date: None,
            source_type: SourceType::ClinicalGuideline,
            origin: SourceOrigin::Curated,
            url: None,
            keywords: ["metformin", "diabete", "hba1c"].iter().map(|k| k.to_string()).collect(),
            embedding: Vec::new(),
        };
        RetrievalResult {
            query: "How is type 2 diabetes treated?".to_string(),
            domain: Domain::Medical,
            items: vec![RetrievedEvidence {
                item: Arc::new(item),
                similarity: 0.6,
                method: RetrievalMethod::Semantic,
            }],
        }
    }

    struct AlwaysEmergency;

    impl RiskClassifier for AlwaysEmergency {
        fn classify(&self, _text: &str) -> RiskTags {
            [RiskTag::Emergency].into_iter().collect()
        }
    }

    struct OneSource;

    impl ExternalSearch for OneSource {
        fn search(&self, _query: &str, _domain: Domain, _limit: usize) -> Result<Vec<ExternalItem>, String> {
            Ok(vec![ExternalItem {
                title: "ADA Standards of Care".to_string(),
                url: "https://diabetesjournals.org".to_string(),
                snippet: String::new(),
                reliability: 0.9,
            }])
        }
    }

    #[test]
    fn test_all_enhancements_in_order() {
        let composer = EnhancementComposer::new(EnhancerConfig::default())
            .unwrap()
            .with_external_search(Arc::new(OneSource));
        let result = medical_result();
        let (text, outcomes) = composer.enhance(
            "Metformin is usually prescribed first [Source 1].",
            &result.query,
            Domain::Medical,
            &result,
        );

        assert_eq!(outcomes.applied_kinds().len(), 4);
        let problem = text.find("**Problem:**").unwrap();
        let sources = text.find("**Sources:**").unwrap();
        let additional = text.find("**Additional sources:**").unwrap();
        let disclaimer = text.find("MEDICAL DISCLAIMER").unwrap();
        assert!(problem < sources && sources < additional && additional < disclaimer);
        assert!((outcomes.evidence.boost - 0.95 / 3.0 * 0.35).abs() < 1e-9);
        assert!((outcomes.external.boost - 0.9 / 3.0 * 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_boosts_independent_of_external_search() {
        let result = medical_result();
        let draft = "Metformin is usually prescribed first [Source 1].";
        let plain = EnhancementComposer::new(EnhancerConfig::default()).unwrap();
        let with_search = EnhancementComposer::new(EnhancerConfig::default())
            .unwrap()
            .with_external_search(Arc::new(OneSource));

        let (_, a) = plain.enhance(draft, &result.query, Domain::Medical, &result);
        let (_, b) = with_search.enhance(draft, &result.query, Domain::Medical, &result);
        assert_eq!(a.safety.boost, b.safety.boost);
        assert_eq!(a.evidence.boost, b.evidence.boost);
        assert_eq!(a.reasoning.boost, b.reasoning.boost);
        assert!(!a.external.applied);
    }

    #[test]
    fn test_custom_classifier() {
        let composer =
            EnhancementComposer::with_classifier(EnhancerConfig::default(), AlwaysEmergency).unwrap();
        let (text, outcomes) = composer.enhance(
            "Hello.",
            "hello",
            Domain::General,
            &RetrievalResult::empty("hello", Domain::General),
        );
        assert!(outcomes.safety.applied);
        assert!(text.contains("CRISIS RESOURCES"));
        assert!(!outcomes.evidence.applied);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EnhancerConfig::default();
        config.expected_sources = 0.0;
        assert!(matches!(
            EnhancementComposer::new(config),
            Err(EnhanceError::Config(_))
        ));
    }
}
