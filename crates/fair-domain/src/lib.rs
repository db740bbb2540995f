//! FAIR Domain Layer
//!
//! Core types and pure scoring logic for the evidence-grounded answer pipeline.
//! Everything here is deterministic and free of I/O; storage, retrieval,
//! generation and orchestration live in the other workspace crates and talk
//! to this one through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Evidence item**: a curated or dataset-derived source with a reliability score
//! - **Retrieval result**: ranked evidence for one query, tagged semantic or keyword
//! - **Enhancement outcome**: transformed text plus a bounded boost
//! - **Confidence breakdown**: base confidence tempered by evidence quality and capped
//! - **Trust metrics**: faithfulness, interpretability, risk awareness,
//!   hallucination reduction and calibration error
//!
//! ## Architecture
//!
//! - Scoring constants live in [`TrustConfig`], never in literals at call sites
//! - [`calibrate`] and [`evaluate`] are pure functions
//! - Capabilities (store, risk classifier, generator, external search) are traits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calibration;
pub mod config;
pub mod domain;
pub mod enhancement;
pub mod evidence;
pub mod report_id;
pub mod retrieval;
pub mod text;
pub mod traits;
pub mod trust;

// Re-exports for convenience
pub use calibration::{calibrate, ConfidenceBreakdown};
pub use config::{BoostLimits, ConfidenceCeilings, HallucinationWeights, TrustConfig};
pub use domain::Domain;
pub use enhancement::{
    EnhancementKind, EnhancementOutcome, EnhancementOutcomes, ExternalItem, RiskTag, RiskTags,
};
pub use evidence::{EvidenceItem, SourceId, SourceOrigin, SourceType};
pub use report_id::ReportId;
pub use retrieval::{NoEvidenceFound, RetrievalMethod, RetrievalResult, RetrievedEvidence};
pub use trust::{evaluate, BaseScores, TrustMetrics};
