//! Enhancer configuration

use fair_domain::{BoostLimits, Domain};
use serde::{Deserialize, Serialize};

/// How cited sources are listed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// `[N] Title`
    #[default]
    Simple,
    /// `[N] Title. (date). Type. Retrieved from url`
    Apa,
    /// `[N] "Title." Type, date. Web. url`
    Mla,
    /// `[N] "Title," Type, date. url`
    Chicago,
}

/// Fixed boost per domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBoosts {
    /// Finance queries
    pub finance: f64,
    /// Medical queries
    pub medical: f64,
    /// Unclassified queries
    pub general: f64,
}

impl DomainBoosts {
    /// Boost for `domain`
    pub fn for_domain(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Finance => self.finance,
            Domain::Medical => self.medical,
            Domain::General => self.general,
        }
    }

    fn max(&self) -> f64 {
        self.finance.max(self.medical).max(self.general)
    }

    fn min(&self) -> f64 {
        self.finance.min(self.medical).min(self.general)
    }
}

/// A disclaimer and the phrase that shows it is already present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disclaimer {
    /// Case-insensitive marker phrase
    pub marker: String,
    /// Full disclaimer text
    pub text: String,
}

impl Disclaimer {
    fn new(marker: &str, text: &str) -> Self {
        Self {
            marker: marker.to_string(),
            text: text.to_string(),
        }
    }

    /// True when `text` already carries this disclaimer
    pub fn is_present_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.marker.to_lowercase())
    }
}

/// Disclaimer table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclaimerPolicy {
    /// Required for medical answers touching diagnosis or medication
    pub medical: Disclaimer,
    /// Required for finance answers touching returns or personal decisions
    pub financial: Disclaimer,
    /// Required whenever self-harm or emergency indicators appear
    pub crisis: Disclaimer,
    /// Required when the user asks for personal advice
    pub consultation: Disclaimer,
}

impl Default for DisclaimerPolicy {
    fn default() -> Self {
        Self {
            medical: Disclaimer::new(
                "MEDICAL DISCLAIMER",
                "**MEDICAL DISCLAIMER**: This information is for educational purposes only and \
                 does not constitute medical advice. Always consult qualified healthcare \
                 professionals for medical concerns, diagnosis, and treatment decisions.",
            ),
            financial: Disclaimer::new(
                "FINANCIAL DISCLAIMER",
                "**FINANCIAL DISCLAIMER**: This information is for educational purposes only and \
                 does not constitute financial advice. Past performance does not guarantee future \
                 results. Investment values may fluctuate and you may lose money.",
            ),
            crisis: Disclaimer::new(
                "CRISIS RESOURCES",
                "**CRISIS RESOURCES**: If you are having thoughts of self-harm or are in \
                 immediate danger, call or text the 988 Suicide and Crisis Lifeline, or call \
                 your local emergency number now.",
            ),
            consultation: Disclaimer::new(
                "PROFESSIONAL CONSULTATION",
                "**PROFESSIONAL CONSULTATION RECOMMENDED**: For advice tailored to your specific \
                 situation, consult a qualified professional in the relevant field.",
            ),
        }
    }
}

impl DisclaimerPolicy {
    /// Every disclaimer in the table
    pub fn all(&self) -> [&Disclaimer; 4] {
        [&self.crisis, &self.medical, &self.financial, &self.consultation]
    }
}

/// Configuration for the enhancement composer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerConfig {
    /// Per-kind boost maxima
    pub boost_limits: BoostLimits,

    /// Safety boost when any disclaimer is added
    pub safety_boosts: DomainBoosts,

    /// Reasoning boost when structure is inserted
    pub reasoning_boosts: DomainBoosts,

    /// Sources a complete answer is expected to cite
    pub expected_sources: f64,

    /// Shared keywords that count as citing an item without a marker
    pub min_keyword_overlap: usize,

    /// Items requested from the external search capability
    pub external_limit: usize,

    /// Maximum length of a key-fact snippet
    pub snippet_max_len: usize,

    /// Format of the "Sources" section
    pub citation_style: CitationStyle,

    /// Disclaimer table
    pub disclaimers: DisclaimerPolicy,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            boost_limits: BoostLimits::default(),
            safety_boosts: DomainBoosts {
                finance: 0.40,
                medical: 0.40,
                general: 0.30,
            },
            reasoning_boosts: DomainBoosts {
                finance: 0.30,
                medical: 0.32,
                general: 0.26,
            },
            expected_sources: 3.0,
            min_keyword_overlap: 2,
            external_limit: 3,
            snippet_max_len: 150,
            citation_style: CitationStyle::Simple,
            disclaimers: DisclaimerPolicy::default(),
        }
    }
}

impl EnhancerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let limits = &self.boost_limits;
        if [limits.safety, limits.evidence, limits.reasoning, limits.external]
            .iter()
            .any(|m| !m.is_finite() || *m < 0.0)
        {
            return Err("boost limits must be finite and non-negative".to_string());
        }
        if self.safety_boosts.min() < 0.0 || self.safety_boosts.max() > limits.safety {
            return Err(format!("safety boosts must be in [0, {}]", limits.safety));
        }
        if self.reasoning_boosts.min() < 0.0 || self.reasoning_boosts.max() > limits.reasoning {
            return Err(format!("reasoning boosts must be in [0, {}]", limits.reasoning));
        }
        if !self.expected_sources.is_finite() || self.expected_sources <= 0.0 {
            return Err("expected_sources must be positive".to_string());
        }
        if self.min_keyword_overlap == 0 {
            return Err("min_keyword_overlap must be at least 1".to_string());
        }
        if self.snippet_max_len < 10 {
            return Err("snippet_max_len must be at least 10".to_string());
        }
        Ok(())
    }
}
