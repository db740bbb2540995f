//! Keyword-table risk classifier

use fair_domain::traits::RiskClassifier;
use fair_domain::{RiskTag, RiskTags};
use regex::{Regex, RegexBuilder};

/// Word-bounded term lists per risk tag
const DEFAULT_TABLE: &[(RiskTag, &[&str])] = &[
    (
        RiskTag::Diagnostic,
        &[
            "symptoms?", "diagnos[ie]s", "diagnosed", "treatment", "therapy", "surgery",
            "screening", "pain", "fever", "headache", "bleeding", "diabetes", "hypertension",
            "cancer", "blood pressure", "cardiovascular", "infection",
        ],
    ),
    (
        RiskTag::Medication,
        &[
            "medications?", "drugs?", "prescriptions?", "dosage", "dose", "pills?", "tablets?",
            "injections?", "insulin", "antibiotics?", "aspirin", "metformin", "statins?",
        ],
    ),
    (
        RiskTag::InvestmentReturn,
        &[
            "returns?", "profits?", "gains?", "yield", "outperform", "guaranteed",
            "price target", "will (?:rise|go up|double)", "bull market", "bear market",
        ],
    ),
    (
        RiskTag::FinancialAdvice,
        &[
            "invest(?:ing|ment|ments)?", "stocks?", "bonds?", "portfolio", "etfs?",
            "mutual funds?", "crypto(?:currency)?", "bitcoin", "retirement", "401\\(?k\\)?",
            "ira", "mortgage", "loans?", "debt", "savings",
        ],
    ),
    (
        RiskTag::SelfHarm,
        &[
            "suicid(?:e|al)", "self-harm", "self harm", "kill myself", "end my life",
            "hurt myself", "overdose",
        ],
    ),
    (
        RiskTag::Emergency,
        &[
            "chest pain", "difficulty breathing", "shortness of breath", "severe bleeding",
            "unconscious", "poisoning", "heart attack", "stroke", "seizure", "anaphylaxis",
            "911", "emergency",
        ],
    ),
    (
        RiskTag::Advisory,
        &[
            "should i", "what should", "how much should", "is it safe", "recommend",
            "advice", "advise", "suggest", "my situation", "for me", "better to",
        ],
    ),
];

/// Classifies text by case-insensitive, word-bounded term matching
#[derive(Debug, Clone)]
pub struct KeywordRiskClassifier {
    rules: Vec<(RiskTag, Regex)>,
}

impl KeywordRiskClassifier {
    /// Classifier with the built-in term tables
    pub fn new() -> Result<Self, regex::Error> {
        Self::from_table(DEFAULT_TABLE.iter().map(|(tag, terms)| (*tag, terms.iter().copied())))
    }

    /// Classifier from custom term tables
    ///
    /// Each term is a regex fragment; it is wrapped in word boundaries.
    pub fn from_table<'a, T>(table: impl IntoIterator<Item = (RiskTag, T)>) -> Result<Self, regex::Error>
    where
        T: IntoIterator<Item = &'a str>,
    {
        let mut rules = Vec::new();
        for (tag, terms) in table {
            let alternation = terms.into_iter().collect::<Vec<_>>().join("|");
            if alternation.is_empty() {
                continue;
            }
            let regex = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .case_insensitive(true)
                .build()?;
            rules.push((tag, regex));
        }
        Ok(Self { rules })
    }
}

impl RiskClassifier for KeywordRiskClassifier {
    fn classify(&self, text: &str) -> RiskTags {
        self.rules
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(tag, _)| *tag)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> KeywordRiskClassifier {
        KeywordRiskClassifier::new().unwrap()
    }

    #[test]
    fn test_medical_tags() {
        let tags = classifier().classify("What dosage of Metformin treats type 2 diabetes?");
        assert!(tags.contains(RiskTag::Medication));
        assert!(tags.contains(RiskTag::Diagnostic));
        assert!(!tags.contains(RiskTag::SelfHarm));
    }

    #[test]
    fn test_finance_and_advisory_tags() {
        let tags = classifier().classify("Should I invest my savings in bitcoin for higher returns?");
        assert!(tags.contains(RiskTag::FinancialAdvice));
        assert!(tags.contains(RiskTag::InvestmentReturn));
        assert!(tags.contains(RiskTag::Advisory));
    }

    #[test]
    fn test_self_harm_and_emergency() {
        let tags = classifier().classify("I have chest pain and I've been thinking about suicide");
        assert!(tags.contains(RiskTag::SelfHarm));
        assert!(tags.contains(RiskTag::Emergency));
    }

    #[test]
    fn test_word_boundaries() {
        // "drugstore" and "returnable" must not match
        let tags = classifier().classify("The drugstore sells returnable bottles.");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_custom_table() {
        let classifier =
            KeywordRiskClassifier::from_table([(RiskTag::Advisory, ["help me"]), (RiskTag::Emergency, [""])])
                .unwrap();
        assert!(classifier.classify("Please help me decide").contains(RiskTag::Advisory));
        assert!(classifier.classify("anything").is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(KeywordRiskClassifier::from_table([(RiskTag::Advisory, ["(unclosed"])]).is_err());
    }
}
