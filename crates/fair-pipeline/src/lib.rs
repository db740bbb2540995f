//! FAIR Pipeline
//!
//! Answers a question end to end: retrieve evidence, generate a draft with an
//! evidence-grounded prompt, enhance the draft, calibrate its confidence and
//! derive the trust metrics.
//!
//! # Architecture
//!
//! ```text
//! query → Retriever → prompt → DraftGenerator → base scores
//!                                             → Composer → Calibrator → Evaluator → TrustReport
//! ```
//!
//! When retrieval finds nothing, or the draft draws on none of the evidence
//! that was found, the pipeline declines to answer and returns
//! [`Outcome::InsufficientEvidence`] instead of an unsupported draft.
//!
//! # Example Usage
//!
//! ```no_run
//! use fair_llm::MockGenerator;
//! use fair_pipeline::{AnswerRequest, PipelineConfig, TrustPipeline};
//! use fair_store::corpus::builtin_catalog;
//! use fair_store::HashingEmbeddingModel;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = HashingEmbeddingModel::default();
//! let catalog = builtin_catalog(&model, Vec::new())?.into_strict()?;
//! let pipeline = TrustPipeline::new(Arc::new(catalog), model, PipelineConfig::default())?;
//!
//! let generator = MockGenerator::new("Diversification spreads risk [Source 1].");
//! let outcome = pipeline
//!     .answer(AnswerRequest::new("Why diversify a portfolio?"), &generator)
//!     .await?;
//!
//! println!("confidence {:.2}", outcome.confidence());
//! println!("{}", outcome.to_json()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod base;
mod config;
mod error;
mod pipeline;
mod report;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::TrustPipeline;
pub use report::{AnswerRequest, Outcome, Refusal, RefusalReason, TrustReport};
