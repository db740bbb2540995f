//! Mock generator for deterministic testing

use crate::GenerationError;
use fair_domain::traits::DraftGenerator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Canned response for prompts containing a pattern
#[derive(Debug, Clone)]
enum Canned {
    Text(String),
    Error,
}

/// Mock draft generator
///
/// Returns the response of the first registered pattern the prompt contains,
/// or the default response. Clones share responses and the call counter.
///
/// # Examples
///
/// ```
/// use fair_llm::MockGenerator;
///
/// let generator = MockGenerator::default();
/// generator.add_response("bond", "Bond prices fall when rates rise [Source 1].");
/// generator.add_error("unavailable");
/// assert_eq!(generator.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerator {
    name: String,
    default_response: String,
    responses: Arc<Mutex<Vec<(String, Canned)>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockGenerator {
    /// Create a generator with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Name reported in trust reports
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Respond with `response` to prompts containing `pattern`
    pub fn add_response(&self, pattern: impl Into<String>, response: impl Into<String>) {
        self.push(pattern.into(), Canned::Text(response.into()));
    }

    /// Fail prompts containing `pattern`
    pub fn add_error(&self, pattern: impl Into<String>) {
        self.push(pattern.into(), Canned::Error);
    }

    fn push(&self, pattern: String, canned: Canned) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern, canned));
    }

    /// Number of times generate was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    fn respond(&self, prompt: &str) -> Result<String, GenerationError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        match responses.iter().find(|(pattern, _)| prompt.contains(pattern.as_str())) {
            Some((_, Canned::Text(text))) => Ok(text.clone()),
            Some((pattern, Canned::Error)) => Err(GenerationError::Other(format!(
                "Mock error for prompt containing '{pattern}'"
            ))),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl DraftGenerator for MockGenerator {
    type Error = GenerationError;

    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.respond(prompt)
    }
}
