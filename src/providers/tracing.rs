//! Tracing wrapper for completion providers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  RagAssistant / CLI │
//! └─────────┬───────────┘
//!           │ complete()
//!           ▼
//! ┌─────────────────────┐
//! │  TracingProvider    │  ← Creates a span per call
//! │  • gen_ai.system    │
//! │  • gen_ai.request.* │
//! │  • gen_ai.response.*│
//! └─────────┬───────────┘
//!           │ delegates
//!           ▼
//! ┌─────────────────────┐
//! │  Inner Provider     │
//! └─────────────────────┘
//! ```
//!
//! Prompt and completion text are recorded only when
//! `EDGEQUAKE_RAG_CAPTURE_CONTENT` is `true` or `1`.

use async_trait::async_trait;
use tracing::{info_span, Instrument};

use crate::error::Result;
use crate::traits::{CompletionProvider, CompletionRequest, CompletionResponse};

/// Span attribute names, following the GenAI semantic conventions.
pub mod genai_attrs {
    pub const OPERATION_NAME: &str = "gen_ai.operation.name";
    pub const SYSTEM: &str = "gen_ai.system";
    pub const REQUEST_MODEL: &str = "gen_ai.request.model";
    pub const REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
    pub const REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
    pub const RESPONSE_ID: &str = "gen_ai.response.id";
    pub const RESPONSE_MODEL: &str = "gen_ai.response.model";
    pub const RESPONSE_STATUS: &str = "gen_ai.response.status";
}

/// Environment switch for recording prompt and completion text.
pub const CAPTURE_CONTENT_ENV: &str = "EDGEQUAKE_RAG_CAPTURE_CONTENT";

fn should_capture_content() -> bool {
    std::env::var(CAPTURE_CONTENT_ENV)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Decorator adding a span around every completion call.
///
/// # Example
///
/// ```ignore
/// use edgequake_rag::providers::{PredictionGuardProvider, TracingProvider};
///
/// let traced = TracingProvider::new(PredictionGuardProvider::from_env()?);
/// let response = traced.complete(&request).await?;
/// ```
pub struct TracingProvider<P: CompletionProvider> {
    inner: P,
}

impl<P: CompletionProvider> TracingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P: CompletionProvider> CompletionProvider for TracingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let span = info_span!(
            "gen_ai.complete",
            { genai_attrs::OPERATION_NAME } = "completion",
            { genai_attrs::SYSTEM } = self.inner.name(),
            { genai_attrs::REQUEST_MODEL } = request.model.as_str(),
            { genai_attrs::REQUEST_MAX_TOKENS } = tracing::field::Empty,
            { genai_attrs::REQUEST_TEMPERATURE } = tracing::field::Empty,
            { genai_attrs::RESPONSE_ID } = tracing::field::Empty,
            { genai_attrs::RESPONSE_MODEL } = tracing::field::Empty,
            { genai_attrs::RESPONSE_STATUS } = tracing::field::Empty,
            prompt_length = request.prompt.len(),
            typed_output = request.output.is_some(),
            "gen_ai.prompt" = tracing::field::Empty,
            "gen_ai.completion.content" = tracing::field::Empty,
        );

        if let Some(max_tokens) = request.max_tokens {
            span.record(genai_attrs::REQUEST_MAX_TOKENS, max_tokens as i64);
        }
        if let Some(temperature) = request.temperature {
            span.record(genai_attrs::REQUEST_TEMPERATURE, temperature);
        }
        if should_capture_content() {
            span.record("gen_ai.prompt", request.prompt.as_str());
        }

        let response = self.inner.complete(request).instrument(span.clone()).await?;

        span.record(genai_attrs::RESPONSE_ID, response.id.as_str());
        if let Some(choice) = response.choices.first() {
            span.record(genai_attrs::RESPONSE_MODEL, choice.model.as_str());
            span.record(genai_attrs::RESPONSE_STATUS, choice.status.as_str());
            if should_capture_content() {
                span.record("gen_ai.completion.content", choice.text.as_str());
            }
        }

        Ok(response)
    }
}
