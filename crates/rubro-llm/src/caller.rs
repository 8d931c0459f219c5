//! Rate-limited calls
//!
//! A [`ConcurrencyPool`] is a counting semaphore. Every call made through
//! [`RateLimitedCaller`] holds one permit from the pool it is given for the
//! whole duration of the request, so at most `size` requests on that pool are
//! in flight at once. Pools can be created per scope (per entity, per batch)
//! and are independent of each other.

use crate::provider::{ChatProvider, ChatRequest};
use crate::CallError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting semaphore bounding in-flight calls
#[derive(Debug, Clone)]
pub struct ConcurrencyPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl ConcurrencyPool {
    /// Create a pool with `size` permits (at least one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Total number of permits
    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a permit; it is released when dropped
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, CallError> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CallError::new(format!("concurrency pool closed: {}", e)))
    }
}

/// Counters shared by every clone of a caller
#[derive(Debug, Default)]
pub struct CallStats {
    issued: AtomicUsize,
    failed: AtomicUsize,
}

impl CallStats {
    /// Calls that reached the provider
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }

    /// Calls that ended in a [`CallError`]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Provider wrapper enforcing a concurrency pool per call
#[derive(Clone)]
pub struct RateLimitedCaller {
    provider: Arc<dyn ChatProvider>,
    stats: Arc<CallStats>,
}

impl RateLimitedCaller {
    /// Wrap a provider
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            stats: Arc::new(CallStats::default()),
        }
    }

    /// Call counters
    pub fn stats(&self) -> &CallStats {
        &self.stats
    }

    /// Send one plain-text prompt under a permit of `pool`
    pub async fn call(
        &self,
        prompt: &str,
        model: &str,
        temperature: f64,
        pool: &ConcurrencyPool,
    ) -> Result<String, CallError> {
        self.send(ChatRequest::new(model, prompt, temperature), pool)
            .await
    }

    /// Like [`RateLimitedCaller::call`], asking the endpoint for JSON output
    pub async fn call_json(
        &self,
        prompt: &str,
        model: &str,
        temperature: f64,
        pool: &ConcurrencyPool,
    ) -> Result<String, CallError> {
        self.send(
            ChatRequest::new(model, prompt, temperature).with_json_output(),
            pool,
        )
        .await
    }

    async fn send(&self, request: ChatRequest, pool: &ConcurrencyPool) -> Result<String, CallError> {
        let _permit = pool.acquire().await?;
        self.stats.issued.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            provider = self.provider.name(),
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Sending LLM request"
        );

        match self.provider.complete(&request).await {
            Ok(text) => Ok(text),
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(provider = self.provider.name(), model = %request.model, error = %e, "LLM call failed");
                Err(e.into())
            }
        }
    }
}
