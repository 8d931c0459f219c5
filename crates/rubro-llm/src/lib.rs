//! Rubro LLM Provider Layer
//!
//! Chat-completion providers and the rate-limited caller used by the
//! classification pipeline.
//!
//! # Providers
//!
//! - `OpenAiCompatProvider`: OpenAI / DeepSeek chat-completions contract (bearer token)
//! - `OllamaProvider`: Ollama `/api/chat` contract (no auth)
//! - `MockProvider`: deterministic, instrumented mock for testing
//!
//! # Calling
//!
//! Providers return `Result<String, LlmError>`. The [`RateLimitedCaller`]
//! wraps a provider, takes one permit from a [`ConcurrencyPool`] per request
//! and collapses every failure into a single [`CallError`] value.
//!
//! ```
//! use rubro_llm::{ConcurrencyPool, MockProvider, RateLimitedCaller};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let caller = RateLimitedCaller::new(Arc::new(MockProvider::new("Hola")));
//! let pool = ConcurrencyPool::new(4);
//! let answer = caller.call("prompt", "deepseek-reasoner", 0.1, &pool).await;
//! assert_eq!(answer.unwrap(), "Hola");
//! # }
//! ```

#![warn(missing_docs)]

pub mod caller;
pub mod config;
pub mod envelope;
pub mod ollama;
pub mod openai;
pub mod provider;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use caller::{CallStats, ConcurrencyPool, RateLimitedCaller};
pub use config::{OllamaOptions, ProviderConfig, ProviderContract};
pub use envelope::ResponseEnvelope;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatProvider;
pub use provider::{build_provider, ChatProvider, ChatRequest};

/// Errors that can occur inside a provider
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request did not complete in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The provider answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider missing a credential or otherwise misconfigured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else {
            LlmError::Communication(e.to_string())
        }
    }
}

/// Failure of one rate-limited call
///
/// Transport errors, timeouts, non-2xx answers and undecodable bodies all
/// collapse into this one value carrying a human-readable cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error: {cause}")]
pub struct CallError {
    /// Human-readable cause
    pub cause: String,
}

impl CallError {
    /// Create a call error from any displayable cause
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

impl From<LlmError> for CallError {
    fn from(e: LlmError) -> Self {
        Self::new(e.to_string())
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without any network traffic. Rules match
/// when the prompt contains their pattern; the first matching rule wins,
/// otherwise the default response is returned.
///
/// The mock is instrumented: it counts calls, records every prompt, and
/// tracks how many calls are in flight at once (useful together with
/// [`MockProvider::with_delay`]).
///
/// # Examples
///
/// ```
/// use rubro_llm::{ChatProvider, ChatRequest, MockProvider};
///
/// # async fn example() {
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("clasificar", r#"{"main_rubros": ["CONSTRUCCION"]}"#);
/// provider.add_error("roto");
///
/// let ok = provider.complete(&ChatRequest::new("m", "por favor clasificar", 0.0)).await;
/// assert!(ok.unwrap().contains("CONSTRUCCION"));
/// assert!(provider.complete(&ChatRequest::new("m", "algo roto", 0.0)).await.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    fail_all: bool,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            fail_all: false,
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            journal: None,
        }
    }

    /// Create a provider whose every call fails
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new("")
        }
    }

    /// Sleep for `delay` inside every call, so concurrent calls overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append `call:<prompt>` to a shared journal when each call starts and
    /// `done:<prompt>` when it returns
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Answer `response` for prompts containing `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((pattern.into(), MockReply::Text(response.into())));
        }
    }

    /// Fail prompts containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((pattern.into(), MockReply::Error));
        }
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Reset the call counters and the prompt log
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.max_in_flight.store(0, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.clear();
        }
    }

    fn reply_for(&self, prompt: &str) -> MockReply {
        if self.fail_all {
            return MockReply::Error;
        }
        let rules = match self.rules.lock() {
            Ok(rules) => rules,
            Err(_) => return MockReply::Error,
        };
        rules
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        if let Some(journal) = &self.journal {
            if let Ok(mut journal) = journal.lock() {
                journal.push(format!("call:{}", request.prompt));
            }
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            if let Ok(mut journal) = journal.lock() {
                journal.push(format!("done:{}", request.prompt));
            }
        }

        match self.reply_for(&request.prompt) {
            MockReply::Text(text) => Ok(text),
            MockReply::Error => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}
