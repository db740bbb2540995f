//! Safety disclaimers

use crate::config::{Disclaimer, DisclaimerPolicy, EnhancerConfig};
use fair_domain::traits::RiskClassifier;
use fair_domain::{Domain, EnhancementKind, EnhancementOutcome, RiskTag, RiskTags};
use tracing::debug;

/// Disclaimers the domain and risk tags call for, in output order
pub fn required_disclaimers<'a>(
    domain: Domain,
    tags: &RiskTags,
    policy: &'a DisclaimerPolicy,
) -> Vec<&'a Disclaimer> {
    let mut required = Vec::new();

    if tags.contains(RiskTag::SelfHarm) || tags.contains(RiskTag::Emergency) {
        required.push(&policy.crisis);
    }
    match domain {
        Domain::Medical if tags.contains(RiskTag::Diagnostic) || tags.contains(RiskTag::Medication) => {
            required.push(&policy.medical)
        }
        Domain::Finance
            if tags.contains(RiskTag::InvestmentReturn) || tags.contains(RiskTag::FinancialAdvice) =>
        {
            required.push(&policy.financial)
        }
        _ => {}
    }
    if tags.contains(RiskTag::Advisory) {
        required.push(&policy.consultation);
    }

    required
}

/// Risk tags for a query and its draft
///
/// Paragraphs of the draft that already carry a disclaimer are not
/// classified, and [`RiskTag::Advisory`] only comes from the query: a draft
/// saying "this is not advice" is not a request for advice.
pub fn classify(
    classifier: &dyn RiskClassifier,
    query: &str,
    draft: &str,
    policy: &DisclaimerPolicy,
) -> RiskTags {
    let mut tags = classifier.classify(query);
    let body = without_disclaimers(draft, policy);
    let draft_tags: RiskTags = classifier
        .classify(&body)
        .iter()
        .filter(|tag| *tag != RiskTag::Advisory)
        .collect();
    tags.extend(&draft_tags);
    tags
}

/// Draft paragraphs that carry none of the policy's disclaimers
fn without_disclaimers(draft: &str, policy: &DisclaimerPolicy) -> String {
    draft
        .split("\n\n")
        .filter(|paragraph| !policy.all().iter().any(|d| d.is_present_in(paragraph)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Append every required disclaimer the draft lacks
///
/// The boost is the fixed per-domain constant whenever at least one
/// disclaimer was added.
pub fn enhance(
    draft: &str,
    query: &str,
    domain: Domain,
    classifier: &dyn RiskClassifier,
    config: &EnhancerConfig,
) -> EnhancementOutcome {
    let tags = classify(classifier, query, draft, &config.disclaimers);
    let missing: Vec<&Disclaimer> = required_disclaimers(domain, &tags, &config.disclaimers)
        .into_iter()
        .filter(|d| !d.is_present_in(draft))
        .collect();

    debug!(
        domain = %domain,
        tags = ?tags.iter().collect::<Vec<_>>(),
        missing = missing.len(),
        "Classified risk"
    );

    if missing.is_empty() {
        return EnhancementOutcome::not_applied(EnhancementKind::Safety);
    }

    let fragment = missing
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let boost = config
        .safety_boosts
        .for_domain(domain)
        .min(config.boost_limits.safety);

    EnhancementOutcome::applied(EnhancementKind::Safety, boost, fragment)
}
