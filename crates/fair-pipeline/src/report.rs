//! Request and result types

use fair_domain::{
    BaseScores, ConfidenceBreakdown, Domain, EnhancementOutcomes, ReportId, RetrievalResult,
    TrustMetrics,
};
use serde::Serialize;

/// A question to answer
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRequest {
    /// Question text
    pub query: String,

    /// Domain; inferred from the query when absent
    pub domain: Option<Domain>,

    /// Evidence items to retrieve; the retriever's `top_k` when absent
    pub top_k: Option<usize>,
}

impl AnswerRequest {
    /// Request with an inferred domain and default `top_k`
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            domain: None,
            top_k: None,
        }
    }

    /// Set the domain explicitly
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set the number of evidence items
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Everything reported for one answered query
///
/// Confidence and metrics are computed from the single retrieval stored in
/// `retrieval`.
#[derive(Debug, Clone, Serialize)]
pub struct TrustReport {
    /// Report identifier
    pub id: ReportId,
    /// Question text
    pub query: String,
    /// Domain the answer was scoped to
    pub domain: Domain,
    /// Name of the draft generator
    pub generator: String,
    /// Enhanced answer text
    pub text: String,
    /// Evidence used, for citation display
    pub retrieval: RetrievalResult,
    /// Per-enhancement results
    pub outcomes: EnhancementOutcomes,
    /// Draft scores before enhancement
    pub base_scores: BaseScores,
    /// How the confidence was derived
    pub confidence: ConfidenceBreakdown,
    /// Reported trust metrics (unclamped)
    pub metrics: TrustMetrics,
    /// Fraction of query terms found in the evidence
    pub evidence_coverage: f64,
}

impl TrustReport {
    /// Final calibrated confidence
    pub fn final_confidence(&self) -> f64 {
        self.confidence.final_confidence
    }

    /// Serialize the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Why the pipeline declined to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    /// Retrieval found nothing
    NoEvidenceFound,
    /// Evidence was found but the draft drew on none of it
    UncitedDraft,
}

/// Explicit refusal when no evidence supports an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Refusal {
    /// Report identifier
    pub id: ReportId,
    /// Question text
    pub query: String,
    /// Domain that was searched
    pub domain: Domain,
    /// Why there is no answer
    pub reason: RefusalReason,
    /// Refusal text shown to the user
    pub text: String,
    /// Always 0.0
    pub confidence: f64,
}

impl Refusal {
    /// Refusal for `query` in `domain` when nothing was retrieved
    pub fn new(query: impl Into<String>, domain: Domain) -> Self {
        Self::with_reason(query, domain, RefusalReason::NoEvidenceFound)
    }

    /// Refusal for a draft that cites none of the retrieved evidence
    pub fn uncited(query: impl Into<String>, domain: Domain) -> Self {
        Self::with_reason(query, domain, RefusalReason::UncitedDraft)
    }

    fn with_reason(query: impl Into<String>, domain: Domain, reason: RefusalReason) -> Self {
        Self {
            id: ReportId::new(),
            query: query.into(),
            domain,
            reason,
            text: refusal_text(domain, reason),
            confidence: 0.0,
        }
    }
}

/// Result of [`TrustPipeline::answer`](crate::TrustPipeline::answer)
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// An evidence-backed answer
    Answered(Box<TrustReport>),
    /// No evidence supports an answer and the pipeline declined to give one
    InsufficientEvidence(Refusal),
}

impl Outcome {
    /// The report, when the query was answered
    pub fn report(&self) -> Option<&TrustReport> {
        match self {
            Outcome::Answered(report) => Some(report),
            Outcome::InsufficientEvidence(_) => None,
        }
    }

    /// True for a refusal
    pub fn is_refusal(&self) -> bool {
        matches!(self, Outcome::InsufficientEvidence(_))
    }

    /// Text shown to the user
    pub fn text(&self) -> &str {
        match self {
            Outcome::Answered(report) => &report.text,
            Outcome::InsufficientEvidence(refusal) => &refusal.text,
        }
    }

    /// Reported confidence; 0.0 for a refusal
    pub fn confidence(&self) -> f64 {
        match self {
            Outcome::Answered(report) => report.final_confidence(),
            Outcome::InsufficientEvidence(refusal) => refusal.confidence,
        }
    }

    /// Serialize as pretty-printed JSON, tagged with `status`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn refusal_text(domain: Domain, reason: RefusalReason) -> String {
    let subject = match domain {
        Domain::Finance => "relevant financial documents or evidence",
        Domain::Medical => "relevant medical documents or evidence",
        Domain::General => "relevant documents or evidence",
    };
    let cause = match reason {
        RefusalReason::NoEvidenceFound => format!("no {subject} were found"),
        RefusalReason::UncitedDraft => {
            format!("the answer I drafted is not supported by the {subject} that were found")
        }
    };
    format!(
        "I cannot answer this question because {cause}. \
         I only provide information that is backed by verified sources."
    )
}
