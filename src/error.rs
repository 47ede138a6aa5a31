//! Error types for the retrieval pipeline, with retry classification.
//!
//! # Error Handling Philosophy
//!
//! Every component surfaces the first error it hits to its caller. Nothing in
//! the pipeline salvages partial results: a failed embedding batch aborts the
//! whole embedding run, a failed similarity aborts the whole search.
//!
//! # Common Errors and Solutions
//!
//! | Error | Cause | Solution |
//! |-------|-------|----------|
//! | `TransportFailure` | Network / HTTP layer failed | Check connectivity, retry |
//! | `DecodeFailure` | Response body was not the expected JSON | Check endpoint URL |
//! | `RemoteStatusFailure` | Remote answered with a non-success status | Check credentials |
//! | `DegenerateVector` | All-zero embedding in a similarity | Inspect the corpus file |
//! | `InvalidConfiguration` | e.g. chunk overlap >= chunk size | Fix `rag.toml` |
//!
//! # Retry Strategies
//!
//! Retrying is opt-in (see [`crate::retry`]). When enabled, each error maps to:
//! - `ExponentialBackoff`: transport failures and timeouts
//! - `WaitAndRetry`: remote status failures (retried once)
//! - `NoRetry`: configuration, decode, degenerate-vector and I/O errors

use std::time::Duration;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;

// ============================================================================
// Retry Strategy
// ============================================================================

/// Strategy for retrying a failed remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff (for transient errors).
    ExponentialBackoff {
        /// Initial delay before first retry.
        base_delay: Duration,
        /// Maximum delay between retries.
        max_delay: Duration,
        /// Maximum number of attempts, including the first one.
        max_attempts: u32,
    },

    /// Wait for a specific duration then retry once.
    WaitAndRetry {
        /// Duration to wait before retrying.
        wait: Duration,
    },

    /// Do not retry at all (permanent error).
    NoRetry,
}

impl RetryStrategy {
    /// Standard exponential backoff for network errors.
    pub fn network_backoff() -> Self {
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            max_attempts: 4,
        }
    }

    /// Single retry after a short pause, for remote status failures.
    pub fn retry_once() -> Self {
        Self::WaitAndRetry {
            wait: Duration::from_secs(1),
        }
    }

    /// Check if this strategy allows retrying.
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::NoRetry)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while chunking, embedding, searching or completing.
#[derive(Debug, Error)]
pub enum RagError {
    /// Network or HTTP layer failure.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// The transport timed out.
    #[error("Request timed out")]
    Timeout,

    /// The response could not be decoded.
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// The response decoded (or arrived) but reported a non-success status.
    #[error("Remote status failure ({status}): {message}")]
    RemoteStatusFailure { status: String, message: String },

    /// Cosine similarity is undefined for a zero vector.
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    /// Invalid configuration or arguments.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A remote embedding (or other batched) operation failed as a whole.
    #[error("Remote call failed during {operation}: {source}")]
    RemoteCallFailed {
        operation: String,
        #[source]
        source: Box<RagError>,
    },

    /// Local file I/O error (corpus files, context files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Wrap an error as the cause of a failed remote operation.
    pub fn remote_call(operation: impl Into<String>, source: RagError) -> Self {
        Self::RemoteCallFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Check whether this is a network-level failure.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::TransportFailure(_) | Self::Timeout => true,
            Self::RemoteCallFailed { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RagError::Timeout
        } else if err.is_connect() {
            RagError::TransportFailure(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            RagError::DecodeFailure(err.to_string())
        } else {
            RagError::TransportFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::DecodeFailure(err.to_string())
    }
}

// ============================================================================
// Retry Strategy Methods
// ============================================================================

impl RagError {
    /// Get the retry strategy for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use edgequake_rag::{RagError, RetryStrategy};
    ///
    /// let error = RagError::TransportFailure("connection reset".to_string());
    /// assert!(error.retry_strategy().should_retry());
    ///
    /// let error = RagError::DegenerateVector("all zeros".to_string());
    /// assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
    /// ```
    pub fn retry_strategy(&self) -> RetryStrategy {
        match self {
            Self::TransportFailure(_) | Self::Timeout => RetryStrategy::network_backoff(),
            Self::RemoteStatusFailure { .. } => RetryStrategy::retry_once(),
            Self::RemoteCallFailed { source, .. } => source.retry_strategy(),
            Self::DecodeFailure(_)
            | Self::DegenerateVector(_)
            | Self::InvalidConfiguration(_)
            | Self::Io(_) => RetryStrategy::NoRetry,
        }
    }

    /// Get a user-facing description of the error with a suggested action.
    pub fn user_description(&self) -> String {
        match self {
            Self::TransportFailure(_) => {
                "Unable to reach the remote API. Check your network connection.".to_string()
            }
            Self::Timeout => "Request timed out. The server may be overloaded.".to_string(),
            Self::DecodeFailure(_) => {
                "The API returned a response that could not be parsed. Check the endpoint URL."
                    .to_string()
            }
            Self::RemoteStatusFailure { status, .. } => format!(
                "The API reported status '{}'. Check your credentials and request parameters.",
                status
            ),
            Self::DegenerateVector(_) => {
                "An embedding vector was all zeros; similarity is undefined.".to_string()
            }
            Self::InvalidConfiguration(msg) => format!("Configuration error: {}.", msg),
            Self::RemoteCallFailed { operation, source } => {
                format!("The {} call failed: {}", operation, source.user_description())
            }
            Self::Io(err) => format!("File error: {}", err),
        }
    }

    /// Check if this error is recoverable (can be retried).
    pub fn is_recoverable(&self) -> bool {
        self.retry_strategy().should_retry()
    }
}
