//! Ollama generator
//!
//! Talks to a local Ollama instance over its HTTP API.
//!
//! # Features
//!
//! - Async HTTP communication with the `/api/generate` endpoint
//! - Configurable endpoint, model and timeout
//! - Retry logic with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use fair_domain::traits::DraftGenerator;
//! use fair_llm::{OllamaConfig, OllamaGenerator};
//!
//! # async fn run() -> Result<(), fair_llm::GenerationError> {
//! let generator = OllamaGenerator::new(OllamaConfig::for_model("llama3.2"))?;
//! let draft = generator.generate("What is diversification?").await?;
//! println!("{draft}");
//! # Ok(())
//! # }
//! ```

use crate::GenerationError;
use fair_domain::traits::DraftGenerator;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for generation requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for an Ollama backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// API endpoint, e.g. `http://localhost:11434`
    pub endpoint: String,
    /// Model name, e.g. `llama3.2`
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts before giving up
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time
    pub initial_backoff_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: 1000,
        }
    }
}

impl OllamaConfig {
    /// Default endpoint with the given model
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

/// Ollama API generator
pub struct OllamaGenerator {
    config: OllamaConfig,
    client: reqwest::Client,
}

/// Request body for the generate API
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from the generate API
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    /// Create a generator
    pub fn new(config: OllamaConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Connection settings
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn attempt(&self, url: &str, body: &GenerateRequest<'_>) -> Result<String, Attempt> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(GenerationError::Communication(format!("Request failed: {e}"))))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Attempt::Fatal(GenerationError::ModelNotAvailable(
                self.config.model.clone(),
            )));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Attempt::Retry(GenerationError::Communication(format!(
                "HTTP {status}: {text}"
            ))));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map(|r| r.response)
            .map_err(|e| {
                Attempt::Fatal(GenerationError::InvalidResponse(format!(
                    "Failed to parse response: {e}"
                )))
            })
    }
}

/// Outcome of one failed attempt
enum Attempt {
    Retry(GenerationError),
    Fatal(GenerationError),
}

impl DraftGenerator for OllamaGenerator {
    type Error = GenerationError;

    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let mut last_error = None;
        for attempt in 1..=self.config.max_retries.max(1) {
            match self.attempt(&url, &body).await {
                Ok(text) => {
                    debug!(model = %self.config.model, attempt, chars = text.len(), "Generated draft");
                    return Ok(text);
                }
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) => {
                    warn!(model = %self.config.model, attempt, error = %e, "Generation attempt failed");
                    last_error = Some(e);
                }
            }
            if attempt < self.config.max_retries {
                tokio::time::sleep(self.config.backoff(attempt)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| GenerationError::Communication("Max retries exceeded".to_string())))
    }
}
