//! Query and evidence domains

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Word stems that route a query to the finance domain
const FINANCE_STEMS: &[&str] = &[
    "invest", "stock", "bond", "portfolio", "retire", "401k", "ira", "roth", "loan",
    "mortgage", "debt", "credit", "budget", "saving", "tax", "dividend", "etf", "fund",
    "market", "interest", "inflation", "bank", "insurance", "annuit", "crypto", "financ",
];

/// Word stems that route a query to the medical domain
const MEDICAL_STEMS: &[&str] = &[
    "symptom", "medic", "drug", "dose", "dosage", "prescri", "diagnos", "treat", "therap",
    "disease", "pain", "blood", "pressure", "diabet", "hypertens", "heart", "cancer",
    "infect", "vaccin", "surgery", "doctor", "clinic", "patient", "ibuprofen", "aspirin",
    "insulin", "health", "stroke", "fever", "allerg",
];

/// Domain of a query or of an evidence item
///
/// Evidence items are always `Finance` or `Medical`. `General` marks a query
/// that could not be classified; it widens retrieval to the full corpus and
/// lowers the confidence ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Personal finance and investing
    Finance,
    /// Health and medicine
    Medical,
    /// Unclassified
    General,
}

impl Domain {
    /// Returns true for the specialized domains backed by a curated corpus
    pub fn is_classified(self) -> bool {
        !matches!(self, Domain::General)
    }

    /// Stable lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Finance => "finance",
            Domain::Medical => "medical",
            Domain::General => "general",
        }
    }

    /// Classify a query by keyword routing
    ///
    /// Counts tokens that start with a domain stem. The domain with strictly
    /// more hits wins; ties and queries with no hits are `General`.
    pub fn infer(query: &str) -> Domain {
        let lowered = query.to_lowercase();
        let mut finance = 0usize;
        let mut medical = 0usize;

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            if FINANCE_STEMS.iter().any(|stem| token.starts_with(stem)) {
                finance += 1;
            }
            if MEDICAL_STEMS.iter().any(|stem| token.starts_with(stem)) {
                medical += 1;
            }
        }

        match finance.cmp(&medical) {
            std::cmp::Ordering::Greater => Domain::Finance,
            std::cmp::Ordering::Less => Domain::Medical,
            std::cmp::Ordering::Equal => Domain::General,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finance" | "financial" => Ok(Domain::Finance),
            "medical" | "medicine" | "health" => Ok(Domain::Medical),
            "general" => Ok(Domain::General),
            other => Err(format!("unknown domain: {other}")),
        }
    }
}
