//! Pre-enhancement scoring of a draft answer
//!
//! Base confidence starts conservative so that only the calibrated boosts can
//! lift it into the reporting range. Base scores are heuristics over the draft
//! text: faithfulness blends a lexical heuristic with word and embedding
//! overlap against the retrieved evidence, interpretability looks for visible
//! reasoning, and risk awareness looks for hedging and referrals.

use fair_domain::text::{term_sequence, terms, tokenize};
use fair_domain::{BaseScores, Domain, RetrievalResult};
use fair_store::{cosine_similarity, EmbeddingModel};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Starting base confidence
pub const BASE_CONFIDENCE: f64 = 0.30;

/// Lower bound of base confidence
pub const BASE_CONFIDENCE_MIN: f64 = 0.20;

/// Upper bound of base confidence
pub const BASE_CONFIDENCE_MAX: f64 = 0.50;

const FACTUAL_PHRASES: &[&str] = &["according to", "studies show", "research indicates", "data suggests"];
const UNCERTAINTY_WORDS: &[&str] = &["may", "might", "could", "possibly", "generally"];
const ABSOLUTE_WORDS: &[&str] = &["definitely", "certainly", "always", "never", "all", "none"];
const FINANCE_WORDS: &[&str] = &["investment", "portfolio", "risk", "return", "market"];
const MEDICAL_WORDS: &[&str] = &["treatment", "symptoms", "diagnosis", "health", "medical"];

const CAUSAL_MARKERS: &[&str] = &["because", "therefore", "since", "thus", "due to", "as a result"];
const TRANSITION_MARKERS: &[&str] = &["first", "second", "next", "then", "finally", "however"];
const REFERENCE_MARKERS: &[&str] = &["[source", "according to", "evidence", "research", "guideline"];
const CONCLUSION_MARKERS: &[&str] = &["in conclusion", "in summary", "overall", "conclusion", "bottom line"];

const HEDGING_MARKERS: &[&str] = &[
    "may", "might", "could", "possibly", "generally", "typically", "varies", "depends", "uncertain",
];
const RISK_MARKERS: &[&str] = &[
    "risk", "risks", "side effects", "caution", "volatility", "loss", "losses", "warning",
    "contraindications", "interactions", "emergency",
];
const REFERRAL_MARKERS: &[&str] = &[
    "consult", "healthcare provider", "financial advisor", "professional", "doctor", "physician",
    "pharmacist",
];

/// Weights of the lexical heuristic, word overlap and embedding overlap in
/// base faithfulness
const FAITHFULNESS_BLEND: (f64, f64, f64) = (0.4, 0.3, 0.3);

/// Conservative base confidence from draft length
///
/// 0.30, +0.10 above 500 characters, +0.05 more above 1000, -0.10 below 200;
/// clamped to [0.20, 0.50].
pub fn base_confidence(draft: &str) -> f64 {
    let chars = draft.trim().chars().count();
    let mut confidence = BASE_CONFIDENCE;
    if chars > 500 {
        confidence += 0.10;
    }
    if chars > 1000 {
        confidence += 0.05;
    }
    if chars < 200 {
        confidence -= 0.10;
    }
    confidence.clamp(BASE_CONFIDENCE_MIN, BASE_CONFIDENCE_MAX)
}

/// Base scores of `draft` before enhancement
///
/// An empty draft gets [`BaseScores::default`].
pub fn base_scores(
    draft: &str,
    domain: Domain,
    retrieval: &RetrievalResult,
    model: &dyn EmbeddingModel,
) -> BaseScores {
    if draft.trim().is_empty() {
        return BaseScores::default();
    }

    let markers = Markers::new(draft);
    let heuristic = heuristic_faithfulness(&markers, domain);
    let lexical = lexical_overlap(draft, retrieval);
    let semantic = semantic_overlap(draft, retrieval, model);

    let (w_heuristic, w_lexical, w_semantic) = FAITHFULNESS_BLEND;
    let scores = BaseScores {
        faithfulness: unit(w_heuristic * heuristic + w_lexical * lexical + w_semantic * semantic),
        interpretability: interpretability(draft, &markers),
        risk_awareness: risk_awareness(&markers),
    };

    debug!(
        domain = %domain,
        heuristic,
        lexical,
        semantic,
        faithfulness = scores.faithfulness,
        interpretability = scores.interpretability,
        risk_awareness = scores.risk_awareness,
        "Scored draft"
    );
    scores
}

/// Lexical faithfulness heuristic, independent of the evidence
pub fn heuristic_faithfulness(markers: &Markers, domain: Domain) -> f64 {
    let mut score = 0.5;

    if markers.count(FACTUAL_PHRASES) > 0 {
        score += 0.10;
    }
    if markers.count(UNCERTAINTY_WORDS) > 0 {
        score += 0.05;
    }
    if markers.count(ABSOLUTE_WORDS) > 2 {
        score -= 0.10;
    }

    let domain_words: &[&str] = match domain {
        Domain::Finance => FINANCE_WORDS,
        Domain::Medical => MEDICAL_WORDS,
        Domain::General => &[],
    };
    score += (markers.count(domain_words) as f64 * 0.02).min(0.10);

    if markers.word_count < 20 {
        score -= 0.10;
    } else if markers.word_count > 200 {
        score -= 0.05;
    }

    unit(score)
}

/// Fraction of the draft's distinct terms that appear in the evidence
pub fn lexical_overlap(draft: &str, retrieval: &RetrievalResult) -> f64 {
    let draft_terms = terms(draft);
    if draft_terms.is_empty() || retrieval.is_empty() {
        return 0.0;
    }

    let evidence_terms: BTreeSet<String> = retrieval
        .iter()
        .flat_map(|e| term_sequence(&format!("{} {}", e.item.title, e.item.content)))
        .collect();

    let shared = draft_terms.intersection(&evidence_terms).count();
    shared as f64 / draft_terms.len() as f64
}

/// Highest cosine similarity between the draft and any retrieved item
///
/// Zero when the draft cannot be embedded.
pub fn semantic_overlap(draft: &str, retrieval: &RetrievalResult, model: &dyn EmbeddingModel) -> f64 {
    if retrieval.is_empty() {
        return 0.0;
    }

    let embedding = match model.embed(draft) {
        Ok(embedding) => embedding,
        Err(e) => {
            warn!(error = %e, "Could not embed draft; semantic overlap is 0");
            return 0.0;
        }
    };

    retrieval
        .iter()
        .map(|e| f64::from(cosine_similarity(&embedding, &e.item.embedding)))
        .fold(0.0, f64::max)
}

fn interpretability(draft: &str, markers: &Markers) -> f64 {
    let mut score = 0.3;

    let steps = draft
        .lines()
        .map(str::trim_start)
        .filter(|line| {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            (digits > 0 && matches!(line[digits..].chars().next(), Some('.') | Some(')')))
                || line.to_lowercase().starts_with("step ")
        })
        .count();
    if steps >= 2 {
        score += 0.15;
    }

    score += (markers.count(CAUSAL_MARKERS) as f64 * 0.05).min(0.15);
    score += (markers.count(TRANSITION_MARKERS) as f64 * 0.03).min(0.12);
    if markers.count(REFERENCE_MARKERS) > 0 {
        score += 0.10;
    }
    if markers.count(CONCLUSION_MARKERS) > 0 {
        score += 0.10;
    }

    unit(score)
}

fn risk_awareness(markers: &Markers) -> f64 {
    let mut score = 0.3;
    score += (markers.count(HEDGING_MARKERS) as f64 * 0.04).min(0.20);
    score += (markers.count(RISK_MARKERS) as f64 * 0.05).min(0.20);
    if markers.count(REFERRAL_MARKERS) > 0 {
        score += 0.15;
    }
    unit(score)
}

/// Lowercased draft and its word set, for marker lookups
///
/// Single-word markers match whole words; phrases and markers containing
/// punctuation match as substrings.
pub struct Markers {
    lowered: String,
    words: BTreeSet<String>,
    word_count: usize,
}

impl Markers {
    /// Index `text`
    pub fn new(text: &str) -> Self {
        let tokens = tokenize(text);
        Self {
            lowered: text.to_lowercase(),
            word_count: text.split_whitespace().count(),
            words: tokens.into_iter().collect(),
        }
    }

    /// How many of `markers` occur at least once
    pub fn count(&self, markers: &[&str]) -> usize {
        markers
            .iter()
            .filter(|marker| {
                if marker.chars().all(char::is_alphanumeric) {
                    self.words.contains(**marker)
                } else {
                    self.lowered.contains(**marker)
                }
            })
            .count()
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
