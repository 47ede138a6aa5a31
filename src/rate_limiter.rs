//! Call pacing for remote API calls.
//!
//! The hosted models are shared and throttle bursts, so batch drivers like
//! the generation sweep space their calls out. A [`RateLimiter`] enforces a
//! minimum interval between the *starts* of successive calls; a
//! [`RateLimitedProvider`] applies it to a completion provider. Only start
//! times are paced; there is no concurrency cap.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::traits::{CompletionProvider, CompletionRequest, CompletionResponse};

/// Default spacing between calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Rate limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Minimum time between the start of two successive calls.
    pub min_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

impl RateLimiterConfig {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }
}

/// Fixed-interval call pacer.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    last_start: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            last_start: Mutex::new(None),
        }
    }

    /// Wait until a call may start, then record the start.
    pub async fn acquire(&self) {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + self.config.min_interval;
            let now = Instant::now();
            if ready_at > now {
                let wait_time = ready_at - now;
                tracing::debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limited: waiting before next call"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());
    }

    /// Get the configuration.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

/// Rate-limited completion provider wrapper.
pub struct RateLimitedProvider<P> {
    inner: P,
    limiter: RateLimiter,
}

impl<P> RateLimitedProvider<P> {
    pub fn new(provider: P, config: RateLimiterConfig) -> Self {
        Self {
            inner: provider,
            limiter: RateLimiter::new(config),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[async_trait]
impl<P: CompletionProvider> CompletionProvider for RateLimitedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.limiter.acquire().await;
        self.inner.complete(request).await
    }
}
