//! Retry executor for remote calls with exponential backoff.
//!
//! The pipeline does not retry by default: every error aborts the current
//! operation. Clients opt in (see `PredictionGuardProviderBuilder::retry`),
//! and the executor then applies the strategy the error itself reports.
//!
//! # Usage
//!
//! ```ignore
//! use edgequake_rag::retry::RetryExecutor;
//!
//! let executor = RetryExecutor::new();
//! let response = executor.execute_auto(|| provider.complete(&request)).await?;
//! ```

use crate::error::{RagError, RetryStrategy};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Executor for retry logic with configurable backoff strategies.
#[derive(Debug, Default)]
pub struct RetryExecutor {
    log_retries: bool,
}

impl RetryExecutor {
    /// Create a new retry executor that logs its attempts.
    pub fn new() -> Self {
        Self { log_retries: true }
    }

    /// Create a retry executor without logging.
    pub fn silent() -> Self {
        Self { log_retries: false }
    }

    /// Execute an async operation, retrying according to `strategy`.
    ///
    /// Returns the result of the operation, or the last error once the
    /// strategy is exhausted.
    pub async fn execute<F, Fut, T>(
        &self,
        strategy: &RetryStrategy,
        mut operation: F,
    ) -> Result<T, RagError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RagError>>,
    {
        match strategy {
            RetryStrategy::NoRetry => operation().await,

            RetryStrategy::WaitAndRetry { wait } => {
                self.execute_wait_and_retry(*wait, operation).await
            }

            RetryStrategy::ExponentialBackoff {
                base_delay,
                max_delay,
                max_attempts,
            } => {
                self.execute_exponential_backoff(*base_delay, *max_delay, *max_attempts, operation)
                    .await
            }
        }
    }

    async fn execute_wait_and_retry<F, Fut, T>(
        &self,
        wait: Duration,
        mut operation: F,
    ) -> Result<T, RagError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RagError>>,
    {
        match operation().await {
            Ok(v) => Ok(v),
            Err(e) => {
                if !e.is_recoverable() {
                    return Err(e);
                }
                if self.log_retries {
                    warn!("Operation failed, waiting {:?} before retry: {}", wait, e);
                }
                sleep(wait).await;
                operation().await
            }
        }
    }

    async fn execute_exponential_backoff<F, Fut, T>(
        &self,
        base_delay: Duration,
        max_delay: Duration,
        max_attempts: u32,
        mut operation: F,
    ) -> Result<T, RagError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RagError>>,
    {
        let mut delay = base_delay;
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(v) => {
                    if attempts > 1 && self.log_retries {
                        info!("Operation succeeded after {} attempts", attempts);
                    }
                    return Ok(v);
                }
                Err(e) => {
                    if attempts >= max_attempts {
                        if self.log_retries {
                            warn!(
                                "Operation failed after {} attempts, giving up: {}",
                                attempts, e
                            );
                        }
                        return Err(e);
                    }

                    if !e.is_recoverable() {
                        if self.log_retries {
                            debug!("Error is non-retryable, stopping: {}", e);
                        }
                        return Err(e);
                    }

                    if self.log_retries {
                        warn!(
                            "Attempt {}/{} failed, retrying in {:?}: {}",
                            attempts, max_attempts, delay, e
                        );
                    }

                    sleep(delay).await;
                    delay = (delay * 2).min(max_delay);
                }
            }
        }
    }

    /// Execute an operation, picking the strategy from the first error.
    pub async fn execute_auto<F, Fut, T>(&self, mut operation: F) -> Result<T, RagError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RagError>>,
    {
        match operation().await {
            Ok(v) => Ok(v),
            Err(e) => {
                let strategy = e.retry_strategy();

                if !strategy.should_retry() {
                    return Err(e);
                }

                if self.log_retries {
                    debug!("First attempt failed, using strategy {:?}: {}", strategy, e);
                }

                match strategy {
                    RetryStrategy::WaitAndRetry { wait } => {
                        sleep(wait).await;
                        operation().await
                    }
                    RetryStrategy::ExponentialBackoff {
                        base_delay,
                        max_delay,
                        max_attempts,
                    } => {
                        sleep(base_delay).await;
                        self.execute_exponential_backoff(
                            (base_delay * 2).min(max_delay),
                            max_delay,
                            max_attempts.saturating_sub(1).max(1),
                            operation,
                        )
                        .await
                    }
                    RetryStrategy::NoRetry => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_backoff(max_attempts: u32) -> RetryStrategy {
        RetryStrategy::ExponentialBackoff {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_no_retry_fails_immediately() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(&RetryStrategy::NoRetry, || {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(RagError::TransportFailure("reset".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exponential_backoff_retries_transport_failures() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(&fast_backoff(3), || {
                let count = call_count_clone.clone();
                async move {
                    let attempts = count.fetch_add(1, Ordering::SeqCst) + 1;
                    if attempts < 3 {
                        Err(RagError::TransportFailure("failed".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exponential_backoff_gives_up() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(&fast_backoff(3), || {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(RagError::Timeout)
                }
            })
            .await;

        assert!(matches!(result, Err(RagError::Timeout)));
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_on_permanent_error() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute(&fast_backoff(5), || {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(RagError::DecodeFailure("garbage".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_retries_remote_status_once() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute_auto(|| {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(RagError::RemoteStatusFailure {
                        status: "500".to_string(),
                        message: "boom".to_string(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(RagError::RemoteStatusFailure { .. })));
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_auto_does_not_retry_degenerate_vector() {
        let executor = RetryExecutor::silent();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = executor
            .execute_auto(|| {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(RagError::DegenerateVector("zero".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
