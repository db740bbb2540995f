//! FAIR Evidence Retriever
//!
//! Hybrid evidence retrieval: cosine similarity against the requested
//! domain's items with a dynamic cutoff (`mean - k * stddev` over the best
//! few matches), topped up by a keyword-overlap pass when the semantic pass
//! returns fewer than `top_k` items.
//!
//! # Examples
//!
//! ```
//! use fair_domain::Domain;
//! use fair_retriever::{EvidenceRetriever, RetrieverConfig};
//! use fair_store::corpus::builtin_catalog;
//! use fair_store::HashingEmbeddingModel;
//! use std::sync::Arc;
//!
//! let model = HashingEmbeddingModel::default();
//! let catalog = builtin_catalog(&model, Vec::new()).unwrap().catalog;
//! let retriever = EvidenceRetriever::new(Arc::new(catalog), model, RetrieverConfig::default());
//!
//! let result = retriever
//!     .retrieve("How do rising interest rates affect bond prices?", Domain::Finance, 3)
//!     .unwrap();
//! assert_eq!(result.items[0].item.id.as_str(), "fin_002");
//! ```

#![warn(missing_docs)]

mod config;
mod coverage;
mod error;
mod keyword;
mod retriever;
mod threshold;

pub use config::RetrieverConfig;
pub use coverage::evidence_coverage;
pub use error::RetrievalError;
pub use keyword::keyword_overlap;
pub use retriever::EvidenceRetriever;
pub use threshold::dynamic_threshold;
