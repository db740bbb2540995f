//! Trust metric evaluation

use crate::{ConfidenceBreakdown, EnhancementOutcomes, TrustConfig};
use serde::{Deserialize, Serialize};

/// Default base faithfulness when no draft text is available
pub const DEFAULT_BASE_FAITHFULNESS: f64 = 0.35;

/// Default base interpretability when no draft text is available
pub const DEFAULT_BASE_INTERPRETABILITY: f64 = 0.40;

/// Default base risk awareness when no draft text is available
pub const DEFAULT_BASE_RISK_AWARENESS: f64 = 0.60;

/// Pre-enhancement scores of a draft answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseScores {
    /// Lexical and semantic grounding of the draft
    pub faithfulness: f64,
    /// Visible reasoning in the draft
    pub interpretability: f64,
    /// Hedging and risk communication in the draft
    pub risk_awareness: f64,
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            faithfulness: DEFAULT_BASE_FAITHFULNESS,
            interpretability: DEFAULT_BASE_INTERPRETABILITY,
            risk_awareness: DEFAULT_BASE_RISK_AWARENESS,
        }
    }
}

/// Trust metrics reported for one answer
///
/// `faithfulness`, `interpretability` and `risk_awareness` are not clamped and
/// may exceed 1.0; a value above 1.0 means more grounding or safety
/// communication than strictly required. Use [`TrustMetrics::display_clamped`]
/// for bounded display values. `calibration_error` is inverse: lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrustMetrics {
    /// Base faithfulness plus the evidence boost
    pub faithfulness: f64,
    /// Base interpretability plus the reasoning boost
    pub interpretability: f64,
    /// Base risk awareness plus the safety boost
    pub risk_awareness: f64,
    /// Weighted composite in [0, 1]
    pub hallucination_reduction: f64,
    /// `|final_confidence - faithfulness|`
    pub calibration_error: f64,
}

impl TrustMetrics {
    /// Copy with every metric clamped to [0, 1]
    pub fn display_clamped(&self) -> TrustMetrics {
        TrustMetrics {
            faithfulness: self.faithfulness.clamp(0.0, 1.0),
            interpretability: self.interpretability.clamp(0.0, 1.0),
            risk_awareness: self.risk_awareness.clamp(0.0, 1.0),
            hallucination_reduction: self.hallucination_reduction.clamp(0.0, 1.0),
            calibration_error: self.calibration_error.clamp(0.0, 1.0),
        }
    }
}

/// Derive the reported trust metrics
///
/// Every metric comes from the same snapshot: the base scores, the outcomes
/// the confidence was calibrated from, and that confidence.
pub fn evaluate(
    base_scores: &BaseScores,
    outcomes: &EnhancementOutcomes,
    confidence: &ConfidenceBreakdown,
    config: &TrustConfig,
) -> TrustMetrics {
    let evidence = non_negative(outcomes.evidence.boost);
    let external = non_negative(outcomes.external.boost);
    let reasoning = non_negative(outcomes.reasoning.boost);
    let safety = non_negative(outcomes.safety.boost);

    let faithfulness = base_scores.faithfulness + evidence;
    let interpretability = base_scores.interpretability + reasoning;
    let risk_awareness = base_scores.risk_awareness + safety;

    let limits = &config.boost_limits;
    let weights = &config.hallucination_weights;
    let composite = weights.evidence * normalize(evidence, limits.evidence)
        + weights.faithfulness * faithfulness
        + weights.external * normalize(external, limits.external);
    let hallucination_reduction = if composite.is_nan() {
        0.0
    } else {
        composite.clamp(0.0, 1.0)
    };

    let calibration_error = (confidence.final_confidence - faithfulness).abs();

    debug_assert!((0.0..=1.0).contains(&hallucination_reduction));
    debug_assert!(calibration_error.is_nan() || calibration_error >= 0.0);

    TrustMetrics {
        faithfulness,
        interpretability,
        risk_awareness,
        hallucination_reduction,
        calibration_error,
    }
}

/// `min(value / max, 1)`
fn normalize(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (value / max).min(1.0)
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{calibrate, Domain};
    use proptest::prelude::*;

    proptest! {
        /// Property: hallucination reduction is clamped even past nominal maxima
        #[test]
        fn test_hallucination_reduction_in_unit_range(
            faithfulness in -1.0f64..3.0,
            evidence in 0.0f64..2.0,
            external in 0.0f64..2.0,
            safety in 0.0f64..1.0,
            reasoning in 0.0f64..1.0,
        ) {
            let config = TrustConfig::default();
            let outcomes = EnhancementOutcomes::from_boosts(safety, evidence, reasoning, external);
            let confidence = calibrate(0.3, &outcomes, Domain::Medical, &config);
            let base = BaseScores { faithfulness, ..BaseScores::default() };
            let metrics = evaluate(&base, &outcomes, &confidence, &config);

            prop_assert!(metrics.hallucination_reduction >= 0.0);
            prop_assert!(metrics.hallucination_reduction <= 1.0);
        }

        /// Property: calibration error is exactly |final - faithfulness|
        #[test]
        fn test_calibration_error_round_trip(
            base_confidence in 0.2f64..0.5,
            faithfulness in 0.0f64..1.0,
            evidence in 0.0f64..0.35,
            safety in 0.0f64..0.4,
            reasoning in 0.0f64..0.32,
        ) {
            let config = TrustConfig::default();
            let outcomes = EnhancementOutcomes::from_boosts(safety, evidence, reasoning, 0.0);
            let confidence = calibrate(base_confidence, &outcomes, Domain::Finance, &config);
            let base = BaseScores { faithfulness, ..BaseScores::default() };
            let metrics = evaluate(&base, &outcomes, &confidence, &config);

            prop_assert_eq!(
                metrics.calibration_error,
                (confidence.final_confidence - metrics.faithfulness).abs()
            );
        }
    }
}
