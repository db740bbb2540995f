//! Configuration for the pipeline

use crate::error::PipelineError;
use fair_domain::TrustConfig;
use fair_enhancer::EnhancerConfig;
use fair_retriever::RetrieverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for [`TrustPipeline`](crate::TrustPipeline)
///
/// Every field has a default, so a TOML file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum time for retrieval (milliseconds)
    pub retrieval_timeout_ms: u64,

    /// Maximum time for a single generation call (seconds)
    pub generation_timeout_secs: u64,

    /// Refuse to answer when retrieval finds nothing
    pub require_evidence: bool,

    /// Calibration and metric constants
    pub trust: TrustConfig,

    /// Retrieval settings
    pub retriever: RetrieverConfig,

    /// Enhancement settings
    pub enhancer: EnhancerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retrieval_timeout_ms: 2_000,
            generation_timeout_secs: 60,
            require_evidence: true,
            trust: TrustConfig::default(),
            retriever: RetrieverConfig::default(),
            enhancer: EnhancerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Lenient preset: answers without evidence and waits longer
    pub fn lenient() -> Self {
        Self {
            retrieval_timeout_ms: 10_000,
            generation_timeout_secs: 300,
            require_evidence: false,
            ..Self::default()
        }
    }

    /// Get the retrieval timeout as a Duration
    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_millis(self.retrieval_timeout_ms)
    }

    /// Get the generation timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.retrieval_timeout_ms == 0 {
            return Err("retrieval_timeout_ms must be greater than 0".to_string());
        }
        if self.generation_timeout_secs == 0 {
            return Err("generation_timeout_secs must be greater than 0".to_string());
        }
        self.trust.validate().map_err(|e| format!("trust: {e}"))?;
        self.retriever.validate().map_err(|e| format!("retriever: {e}"))?;
        self.enhancer.validate().map_err(|e| format!("enhancer: {e}"))?;
        if self.enhancer.boost_limits != self.trust.boost_limits {
            return Err("enhancer.boost_limits must match trust.boost_limits".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents).map_err(PipelineError::Config)?;
        config.validate().map_err(PipelineError::Config)?;
        Ok(config)
    }
}
