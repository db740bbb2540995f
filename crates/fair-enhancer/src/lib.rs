//! FAIR Enhancement Composer
//!
//! Turns a draft answer into the final answer and measures what each step
//! added:
//! - **Reasoning**: rebuilds unstructured drafts as Problem / Key facts /
//!   Analysis / Caveats / Conclusion
//! - **Evidence**: lists the retrieved sources the draft cites
//! - **External**: lists sources from an optional external search
//! - **Safety**: appends the disclaimers the domain and risk tags require
//!
//! Every enhancement is total: when there is nothing to act on it reports
//! `applied = false` with zero boost.
//!
//! # Examples
//!
//! ```
//! use fair_domain::{Domain, RetrievalResult};
//! use fair_enhancer::{EnhancementComposer, EnhancerConfig};
//!
//! let composer = EnhancementComposer::new(EnhancerConfig::default()).unwrap();
//! let evidence = RetrievalResult::empty("Should I buy bitcoin?", Domain::Finance);
//! let (text, outcomes) = composer.enhance(
//!     "Bitcoin is highly volatile.",
//!     "Should I buy bitcoin?",
//!     Domain::Finance,
//!     &evidence,
//! );
//! assert!(text.contains("FINANCIAL DISCLAIMER"));
//! assert!(outcomes.safety.applied);
//! assert!(!outcomes.evidence.applied);
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod composer;
pub mod config;
pub mod error;
pub mod evidence;
pub mod external;
pub mod reasoning;
pub mod safety;

pub use classifier::KeywordRiskClassifier;
pub use composer::EnhancementComposer;
pub use config::{CitationStyle, Disclaimer, DisclaimerPolicy, DomainBoosts, EnhancerConfig};
pub use error::EnhanceError;
