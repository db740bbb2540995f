//! Enhancement outcomes and risk tags

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The four independent enhancements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementKind {
    /// Domain disclaimers
    Safety,
    /// Citations of retrieved evidence
    Evidence,
    /// Enumerated reasoning structure
    Reasoning,
    /// Citations of externally searched sources
    External,
}

impl fmt::Display for EnhancementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnhancementKind::Safety => "safety",
            EnhancementKind::Evidence => "evidence",
            EnhancementKind::Reasoning => "reasoning",
            EnhancementKind::External => "external",
        };
        f.write_str(name)
    }
}

/// Result of running one enhancement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementOutcome {
    /// Which enhancement produced this outcome
    pub kind: EnhancementKind,
    /// False when the enhancement found nothing to act on
    pub applied: bool,
    /// Boost in `[0, max]` for this kind; 0 when not applied
    pub boost: f64,
    /// Text fragment the enhancement contributed (empty when not applied)
    pub fragment: String,
}

impl EnhancementOutcome {
    /// An applied outcome
    pub fn applied(kind: EnhancementKind, boost: f64, fragment: impl Into<String>) -> Self {
        Self {
            kind,
            applied: true,
            boost,
            fragment: fragment.into(),
        }
    }

    /// A no-op outcome with zero boost
    pub fn not_applied(kind: EnhancementKind) -> Self {
        Self {
            kind,
            applied: false,
            boost: 0.0,
            fragment: String::new(),
        }
    }
}

/// One outcome per enhancement kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementOutcomes {
    /// Safety disclaimers
    pub safety: EnhancementOutcome,
    /// Local evidence citations
    pub evidence: EnhancementOutcome,
    /// Reasoning structure
    pub reasoning: EnhancementOutcome,
    /// External search citations
    pub external: EnhancementOutcome,
}

impl EnhancementOutcomes {
    /// All four outcomes as no-ops
    pub fn none() -> Self {
        Self {
            safety: EnhancementOutcome::not_applied(EnhancementKind::Safety),
            evidence: EnhancementOutcome::not_applied(EnhancementKind::Evidence),
            reasoning: EnhancementOutcome::not_applied(EnhancementKind::Reasoning),
            external: EnhancementOutcome::not_applied(EnhancementKind::External),
        }
    }

    /// Build from raw boosts, marking a kind applied when its boost is positive
    ///
    /// Convenient for scoring without text, e.g. in tests and replays.
    pub fn from_boosts(safety: f64, evidence: f64, reasoning: f64, external: f64) -> Self {
        let outcome = |kind, boost: f64| {
            if boost > 0.0 {
                EnhancementOutcome::applied(kind, boost, "")
            } else {
                EnhancementOutcome::not_applied(kind)
            }
        };
        Self {
            safety: outcome(EnhancementKind::Safety, safety),
            evidence: outcome(EnhancementKind::Evidence, evidence),
            reasoning: outcome(EnhancementKind::Reasoning, reasoning),
            external: outcome(EnhancementKind::External, external),
        }
    }

    /// Iterate the outcomes in application-independent order
    pub fn iter(&self) -> impl Iterator<Item = &EnhancementOutcome> {
        [&self.safety, &self.evidence, &self.reasoning, &self.external].into_iter()
    }

    /// Kinds that were applied
    pub fn applied_kinds(&self) -> Vec<EnhancementKind> {
        self.iter().filter(|o| o.applied).map(|o| o.kind).collect()
    }
}

/// A source returned by an external search capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalItem {
    /// Page or document title
    pub title: String,
    /// Location of the source
    pub url: String,
    /// Short excerpt
    pub snippet: String,
    /// Reliability in [0, 1]
    pub reliability: f64,
}

/// A category of risk detected in text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTag {
    /// Diagnostic or treatment claims
    Diagnostic,
    /// Medication or dosage content
    Medication,
    /// Predictions about investment returns
    InvestmentReturn,
    /// Personal financial decisions
    FinancialAdvice,
    /// Self-harm indicators
    SelfHarm,
    /// Medical emergency indicators
    Emergency,
    /// The user is asking for personal advice
    Advisory,
}

/// Set of risk tags produced by a classifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RiskTags(BTreeSet<RiskTag>);

impl RiskTags {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag
    pub fn insert(&mut self, tag: RiskTag) {
        self.0.insert(tag);
    }

    /// True when `tag` is present
    pub fn contains(&self, tag: RiskTag) -> bool {
        self.0.contains(&tag)
    }

    /// True when no risk was detected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in a stable order
    pub fn iter(&self) -> impl Iterator<Item = RiskTag> + '_ {
        self.0.iter().copied()
    }

    /// Merge another set into this one
    pub fn extend(&mut self, other: &RiskTags) {
        self.0.extend(other.0.iter().copied());
    }
}

impl FromIterator<RiskTag> for RiskTags {
    fn from_iter<I: IntoIterator<Item = RiskTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
