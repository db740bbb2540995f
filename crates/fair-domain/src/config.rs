//! Scoring constants for calibration and trust evaluation

use crate::{Domain, EnhancementKind};
use serde::{Deserialize, Serialize};

/// Maximum boost for safety disclaimers
pub const SAFETY_BOOST_MAX: f64 = 0.40;

/// Maximum boost for local evidence citations
pub const EVIDENCE_BOOST_MAX: f64 = 0.35;

/// Maximum boost for reasoning structure
pub const REASONING_BOOST_MAX: f64 = 0.32;

/// Maximum boost for external search citations
pub const EXTERNAL_BOOST_MAX: f64 = 0.15;

/// Per-kind boost maxima
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostLimits {
    /// Safety disclaimers
    pub safety: f64,
    /// Local evidence
    pub evidence: f64,
    /// Reasoning structure
    pub reasoning: f64,
    /// External search
    pub external: f64,
}

impl Default for BoostLimits {
    fn default() -> Self {
        Self {
            safety: SAFETY_BOOST_MAX,
            evidence: EVIDENCE_BOOST_MAX,
            reasoning: REASONING_BOOST_MAX,
            external: EXTERNAL_BOOST_MAX,
        }
    }
}

impl BoostLimits {
    /// Maximum for one enhancement kind
    pub fn max_for(&self, kind: EnhancementKind) -> f64 {
        match kind {
            EnhancementKind::Safety => self.safety,
            EnhancementKind::Evidence => self.evidence,
            EnhancementKind::Reasoning => self.reasoning,
            EnhancementKind::External => self.external,
        }
    }
}

/// Upper bounds on reported confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceCeilings {
    /// Finance and medical queries
    pub domain: f64,
    /// Unclassified queries
    pub unclassified: f64,
}

impl Default for ConfidenceCeilings {
    fn default() -> Self {
        Self {
            domain: 0.85,
            unclassified: 0.70,
        }
    }
}

/// Weights of the hallucination-reduction composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HallucinationWeights {
    /// Normalized evidence boost
    pub evidence: f64,
    /// Faithfulness
    pub faithfulness: f64,
    /// Normalized external boost
    pub external: f64,
}

impl Default for HallucinationWeights {
    fn default() -> Self {
        Self {
            evidence: 0.50,
            faithfulness: 0.35,
            external: 0.15,
        }
    }
}

/// Configuration for confidence calibration and trust evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Per-kind boost maxima
    pub boost_limits: BoostLimits,
    /// Confidence ceilings
    pub ceilings: ConfidenceCeilings,
    /// Lowest confidence ever reported for an answered query
    pub confidence_floor: f64,
    /// Evidence quality used when there is no evidence boost at all
    pub quality_fallback: f64,
    /// Share of the safety boost kept at zero evidence quality
    pub safety_scale_floor: f64,
    /// Share of the reasoning boost kept at zero evidence quality
    pub reasoning_scale_floor: f64,
    /// Hallucination-reduction weights
    pub hallucination_weights: HallucinationWeights,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            boost_limits: BoostLimits::default(),
            ceilings: ConfidenceCeilings::default(),
            confidence_floor: 0.20,
            quality_fallback: 0.5,
            safety_scale_floor: 0.3,
            reasoning_scale_floor: 0.4,
            hallucination_weights: HallucinationWeights::default(),
        }
    }
}

impl TrustConfig {
    /// Confidence ceiling for a domain
    pub fn ceiling(&self, domain: Domain) -> f64 {
        if domain.is_classified() {
            self.ceilings.domain
        } else {
            self.ceilings.unclassified
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let limits = &self.boost_limits;
        for (name, value) in [
            ("boost_limits.safety", limits.safety),
            ("boost_limits.evidence", limits.evidence),
            ("boost_limits.reasoning", limits.reasoning),
            ("boost_limits.external", limits.external),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive number"));
            }
        }

        if !(0.0..1.0).contains(&self.confidence_floor) {
            return Err("confidence_floor must be in [0, 1)".to_string());
        }
        for (name, value) in [
            ("ceilings.domain", self.ceilings.domain),
            ("ceilings.unclassified", self.ceilings.unclassified),
        ] {
            if !(value > self.confidence_floor && value <= 1.0) {
                return Err(format!("{name} must be in (confidence_floor, 1]"));
            }
        }

        for (name, value) in [
            ("quality_fallback", self.quality_fallback),
            ("safety_scale_floor", self.safety_scale_floor),
            ("reasoning_scale_floor", self.reasoning_scale_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0, 1]"));
            }
        }

        let w = &self.hallucination_weights;
        if [w.evidence, w.faithfulness, w.external]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err("hallucination weights must be non-negative".to_string());
        }
        if (w.evidence + w.faithfulness + w.external - 1.0).abs() > 1e-6 {
            return Err("hallucination weights must sum to 1".to_string());
        }

        Ok(())
    }
}
