//! Error types for building an enhancer
//!
//! Enhancement itself never fails; these only arise at construction.

use thiserror::Error;

/// Errors that can occur while building an enhancement composer
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A risk pattern failed to compile
    #[error("Invalid risk pattern: {0}")]
    Pattern(#[from] regex::Error),
}
