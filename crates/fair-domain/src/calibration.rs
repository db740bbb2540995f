//! Confidence calibration
//!
//! Combines a conservative base confidence with the enhancement boosts. The
//! safety and reasoning boosts are tempered by an evidence-quality factor so
//! that a well-formatted answer without evidence cannot saturate confidence;
//! the evidence boost itself is added as is. The result is capped at a
//! domain-specific ceiling.

use crate::{Domain, EnhancementOutcomes, TrustConfig};
use serde::Serialize;

/// How the final confidence of one answer was derived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    /// Domain the ceiling was taken from
    pub domain: Domain,
    /// Base confidence after clamping into `[floor, ceiling]`
    pub base_confidence: f64,
    /// Evidence-quality factor in [0, 1]
    pub evidence_quality: f64,
    /// Safety boost after quality scaling
    pub scaled_safety: f64,
    /// Raw evidence boost
    pub evidence_boost: f64,
    /// Reasoning boost after quality scaling
    pub scaled_reasoning: f64,
    /// Ceiling applied to the sum
    pub ceiling: f64,
    /// Reported confidence
    pub final_confidence: f64,
}

/// Calibrate the confidence of one answer
///
/// `final = min(base + scaled_safety + evidence + scaled_reasoning, ceiling)`
/// where each scalable boost is multiplied by `floor + (1 - floor) * quality`.
///
/// Pure and total: negative or NaN boosts count as zero and the base is
/// clamped into `[confidence_floor, ceiling]`, so `base <= final <= ceiling`
/// always holds. The result is non-decreasing in the base, the safety boost
/// and the reasoning boost, and in the evidence boost for any positive
/// evidence boost. A zero evidence boost selects the fallback quality.
pub fn calibrate(
    base_confidence: f64,
    outcomes: &EnhancementOutcomes,
    domain: Domain,
    config: &TrustConfig,
) -> ConfidenceBreakdown {
    let ceiling = config.ceiling(domain);
    let floor = config.confidence_floor.min(ceiling);

    // Step 1: sanitize inputs
    let base = if base_confidence.is_nan() {
        floor
    } else {
        base_confidence.clamp(floor, ceiling)
    };
    let safety = non_negative(outcomes.safety.boost);
    let evidence = non_negative(outcomes.evidence.boost);
    let reasoning = non_negative(outcomes.reasoning.boost);

    // Step 2: evidence quality
    let quality = evidence_quality(evidence, config);

    // Step 3: scale the non-evidence boosts
    let scaled_safety = safety * scale(config.safety_scale_floor, quality);
    let scaled_reasoning = reasoning * scale(config.reasoning_scale_floor, quality);

    // Step 4: combine and cap
    let final_confidence = (base + scaled_safety + evidence + scaled_reasoning).min(ceiling);

    debug_assert!(
        final_confidence <= ceiling,
        "confidence {final_confidence} exceeds ceiling {ceiling}"
    );
    debug_assert!(
        final_confidence >= base,
        "confidence {final_confidence} fell below base {base}"
    );

    ConfidenceBreakdown {
        domain,
        base_confidence: base,
        evidence_quality: quality,
        scaled_safety,
        evidence_boost: evidence,
        scaled_reasoning,
        ceiling,
        final_confidence,
    }
}

/// Evidence-quality factor
///
/// `min(evidence / evidence_max, 1)` when any evidence boost exists, otherwise
/// the configured fallback.
pub fn evidence_quality(evidence_boost: f64, config: &TrustConfig) -> f64 {
    if evidence_boost > 0.0 {
        (evidence_boost / config.boost_limits.evidence).min(1.0)
    } else {
        config.quality_fallback
    }
}

fn scale(floor: f64, quality: f64) -> f64 {
    floor + (1.0 - floor) * quality
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(base: f64, safety: f64, evidence: f64, reasoning: f64, domain: Domain) -> ConfidenceBreakdown {
        let outcomes = EnhancementOutcomes::from_boosts(safety, evidence, reasoning, 0.0);
        calibrate(base, &outcomes, domain, &TrustConfig::default())
    }

    #[test]
    fn test_weak_evidence_scenario() {
        let b = run(0.30, 0.40, 0.05, 0.32, Domain::Finance);

        // quality = 0.05 / 0.35 = 0.143
        assert!((b.evidence_quality - 0.143).abs() < 0.001);
        // 0.40 * (0.3 + 0.7 * 0.143) = 0.160
        assert!((b.scaled_safety - 0.160).abs() < 0.001);
        // 0.32 * (0.4 + 0.6 * 0.143) = 0.155
        assert!((b.scaled_reasoning - 0.155).abs() < 0.001);
        // 0.30 + 0.160 + 0.05 + 0.155 = 0.665
        assert!((b.final_confidence - 0.665).abs() < 0.001);
    }

    #[test]
    fn test_zero_evidence_uses_fallback_quality() {
        let b = run(0.30, 0.40, 0.0, 0.32, Domain::Medical);

        assert_eq!(b.evidence_quality, 0.5);
        // 0.40 * (0.3 + 0.35) = 0.26
        assert!((b.scaled_safety - 0.26).abs() < 1e-9);
        // 0.32 * (0.4 + 0.3) = 0.224
        assert!((b.scaled_reasoning - 0.224).abs() < 1e-9);
        assert!((b.final_confidence - 0.784).abs() < 1e-9);
    }

    #[test]
    fn test_full_boosts_saturate_at_domain_ceiling() {
        let b = run(0.50, 0.40, 0.35, 0.32, Domain::Finance);
        assert_eq!(b.evidence_quality, 1.0);
        assert_eq!(b.final_confidence, 0.85);
    }

    #[test]
    fn test_unclassified_ceiling_is_lower() {
        let b = run(0.50, 0.40, 0.35, 0.32, Domain::General);
        assert_eq!(b.ceiling, 0.70);
        assert_eq!(b.final_confidence, 0.70);
    }

    #[test]
    fn test_no_boosts_returns_base() {
        let b = run(0.35, 0.0, 0.0, 0.0, Domain::Finance);
        assert_eq!(b.final_confidence, 0.35);
    }

    #[test]
    fn test_base_clamped_to_floor_and_ceiling() {
        assert_eq!(run(0.05, 0.0, 0.0, 0.0, Domain::Finance).base_confidence, 0.20);
        assert_eq!(run(0.95, 0.0, 0.0, 0.0, Domain::General).base_confidence, 0.70);
        assert_eq!(run(f64::NAN, 0.0, 0.0, 0.0, Domain::General).base_confidence, 0.20);
    }

    #[test]
    fn test_negative_and_nan_boosts_ignored() {
        let b = run(0.30, -1.0, f64::NAN, -0.2, Domain::Finance);
        assert_eq!(b.final_confidence, 0.30);
        assert_eq!(b.evidence_boost, 0.0);
    }
}
