//! Evidence items held by the evidence store

use crate::Domain;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of an evidence source (e.g. `fin_001`, `dataset_med_0042`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Kind of publication an evidence item was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Peer-reviewed study
    #[serde(alias = "academic_research")]
    ResearchPaper,
    /// Guidance from a government agency
    GovernmentGuidance,
    /// Clinical practice guideline
    ClinicalGuideline,
    /// Regulator publication
    Regulatory,
    /// Educational material from a reputable institution
    #[serde(alias = "financial_textbook")]
    Educational,
    /// Market analysis or investor alert
    MarketAnalysis,
    /// Financial planning guidance
    FinancialPlanning,
    /// Question/answer pair imported from a public dataset
    QaDataset,
    /// Anything else
    #[serde(other)]
    Other,
}

impl SourceType {
    /// Human-readable label used in prompts and citations
    pub fn label(self) -> &'static str {
        match self {
            SourceType::ResearchPaper => "research paper",
            SourceType::GovernmentGuidance => "government guidance",
            SourceType::ClinicalGuideline => "clinical guideline",
            SourceType::Regulatory => "regulatory",
            SourceType::Educational => "educational",
            SourceType::MarketAnalysis => "market analysis",
            SourceType::FinancialPlanning => "financial planning",
            SourceType::QaDataset => "Q&A dataset",
            SourceType::Other => "other",
        }
    }
}

/// Where an evidence item entered the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Hand-curated entry
    Curated,
    /// Derived from an imported dataset
    Dataset,
}

/// A single piece of evidence
///
/// Created once at corpus build or import time and immutable afterwards. The
/// store owns items behind `Arc`, so retrieval results share them without
/// copying content or embeddings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceItem {
    /// Stable source id
    pub id: SourceId,
    /// Short title
    pub title: String,
    /// Free-text content
    pub content: String,
    /// Finance or medical
    pub domain: Domain,
    /// Reliability in [0, 1] assigned at curation time
    pub reliability: f64,
    /// Publication date, when known
    pub publication_date: Option<NaiveDate>,
    /// Publication kind
    pub source_type: SourceType,
    /// Curated or dataset-derived
    pub origin: SourceOrigin,
    /// Link to the original source, when available
    pub url: Option<String>,
    /// Lowercased keyword set used by the keyword fallback
    pub keywords: BTreeSet<String>,
    /// Precomputed embedding; never serialized
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl EvidenceItem {
    /// True when the item carries `keyword` (already lowercased)
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }
}
