//! Provider traits for text completion and text embedding, plus the
//! completion wire types.
//!
//! # WHY: Trait-Based Provider Abstraction
//!
//! The orchestrator only talks to [`CompletionProvider`] and
//! [`EmbeddingProvider`]. Concrete HTTP clients live in [`crate::providers`],
//! and the mock providers make the whole pipeline testable without network
//! access.
//!
//! # Completion wire format
//!
//! ```json
//! { "model": "Nous-Hermes-Llama2-13B", "prompt": "...", "max_tokens": 100,
//!   "temperature": 0.1,
//!   "output": { "type": "categorical", "categories": ["yes", "no"] } }
//! ```
//!
//! Absent optional parameters are omitted from the request body.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{RagError, Result};

/// An embedding vector. Dimensionality is whatever the model produces.
pub type Embedding = Vec<f64>;

/// Status value reported by a successful completion choice.
pub const SUCCESS_STATUS: &str = "success";

// ============================================================================
// Typed Output
// ============================================================================

/// Kind of typed output the completion endpoint should constrain to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Categorical,
    Integer,
    Float,
    Boolean,
    Json,
}

/// Constraint or quality check applied to the generated text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedOutput {
    /// Output type, e.g. `categorical`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,

    /// Allowed categories for `categorical` output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Regex the output must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub consistency: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub factuality: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub toxicity: bool,
}

impl TypedOutput {
    /// Restrict output to one of `categories`.
    pub fn categorical<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output_type: Some(OutputType::Categorical),
            categories: categories.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// The `yes`/`no` categorical constraint used for intent classification.
    pub fn yes_no() -> Self {
        Self::categorical(["yes", "no"])
    }

    /// Restrict output to text matching a regex pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Default::default()
        }
    }

    /// Ask the endpoint to run its toxicity check.
    pub fn toxicity() -> Self {
        Self {
            toxicity: true,
            ..Default::default()
        }
    }

    /// Ask the endpoint to run its factuality check.
    pub fn factuality() -> Self {
        Self {
            factuality: true,
            ..Default::default()
        }
    }

    /// Ask the endpoint to run its consistency check.
    pub fn consistency() -> Self {
        Self {
            consistency: true,
            ..Default::default()
        }
    }
}

// ============================================================================
// Completion Request / Response
// ============================================================================

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<TypedOutput>,
}

impl CompletionRequest {
    /// Create a request with no generation parameters set.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            output: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_output(mut self, output: TypedOutput) -> Self {
        self.output = Some(output);
        self
    }
}

/// One generated choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub text: String,

    /// Typed output payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JsonValue>,

    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub model: String,
}

impl CompletionChoice {
    /// A choice reports success when its status is `success` or absent.
    pub fn is_success(&self) -> bool {
        self.status.is_empty() || self.status == SUCCESS_STATUS
    }
}

/// Response from the completion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub object: String,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// Build a single-choice successful response.
    pub fn from_text(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            object: "text_completion".to_string(),
            choices: vec![CompletionChoice {
                text: text.into(),
                status: SUCCESS_STATUS.to_string(),
                model: model.into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// The first choice, or `DecodeFailure` when the response has none.
    pub fn first_choice(&self) -> Result<&CompletionChoice> {
        self.choices.first().ok_or_else(|| {
            RagError::DecodeFailure(format!("completion response '{}' has no choices", self.id))
        })
    }

    /// The first choice, failing with `RemoteStatusFailure` unless it succeeded.
    pub fn first_successful_choice(&self) -> Result<&CompletionChoice> {
        let choice = self.first_choice()?;
        if !choice.is_success() {
            return Err(RagError::RemoteStatusFailure {
                status: choice.status.clone(),
                message: format!("completion choice {} was not successful", choice.index),
            });
        }
        Ok(choice)
    }
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Trait for providers that generate text completions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Send one completion request and wait for the response.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Trait for providers that can generate text embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the embedding model.
    fn model(&self) -> &str;

    /// Largest number of texts accepted by a single `embed` call.
    fn max_batch_size(&self) -> usize;

    /// Generate embeddings for a batch of texts, one per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Generate embedding for a single text.
    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let results = self.embed(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::DecodeFailure("Empty embedding result".to_string()))
    }
}
