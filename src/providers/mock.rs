//! Mock completion and embedding providers for testing.
//!
//! Both mocks are deterministic and record what they were asked:
//! - [`MockCompletionProvider`]: queue-based responses, recorded requests
//! - [`MockEmbeddingProvider`]: fixed or hash-derived vectors, recorded batches,
//!   injectable batch failures

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{RagError, Result};
use crate::traits::{
    CompletionProvider, CompletionRequest, CompletionResponse, Embedding, EmbeddingProvider,
};

/// Returned when the completion queue is empty.
pub const MOCK_DEFAULT_COMPLETION: &str = "Mock response";

/// Mock completion provider.
///
/// # Example
/// ```
/// use edgequake_rag::providers::MockCompletionProvider;
/// use edgequake_rag::traits::{CompletionProvider, CompletionRequest};
///
/// # #[tokio::main]
/// # async fn main() {
/// let provider = MockCompletionProvider::new();
/// provider.add_response("yes").await;
///
/// let response = provider
///     .complete(&CompletionRequest::new("any-model", "Is this a question?"))
///     .await
///     .unwrap();
/// assert_eq!(response.choices[0].text, "yes");
/// assert_eq!(provider.requests().await.len(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockCompletionProvider {
    responses: Arc<Mutex<Vec<Result<CompletionResponse>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful single-choice response with the given text.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push(Ok(CompletionResponse::from_text(text, "mock-model")));
    }

    /// Queue a full response (e.g. one carrying a non-success status).
    pub async fn add_raw_response(&self, response: CompletionResponse) {
        self.responses.lock().await.push(Ok(response));
    }

    /// Queue an error.
    pub async fn add_error(&self, error: RagError) {
        self.responses.lock().await.push(Err(error));
    }

    /// All requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().await.push(request.clone());

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            Ok(CompletionResponse::from_text(
                MOCK_DEFAULT_COMPLETION,
                request.model.clone(),
            ))
        } else {
            responses.remove(0)
        }
    }
}

#[derive(Debug, Default)]
struct EmbeddingState {
    fixed: HashMap<String, Embedding>,
    batches: Vec<Vec<String>>,
    fail_on_batch: Option<usize>,
    short_on_batch: Option<usize>,
}

/// Mock embedding provider.
///
/// Texts registered with [`MockEmbeddingProvider::add_vector`] get that exact
/// vector; everything else gets [`MockEmbeddingProvider::vector_for`], which
/// is stable across runs and never all zeros.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    max_batch_size: usize,
    state: Arc<Mutex<EmbeddingState>>,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_batch_size: crate::embedding::DEFAULT_EMBED_BATCH_SIZE,
            state: Arc::new(Mutex::new(EmbeddingState::default())),
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Pin the vector returned for `text`.
    pub async fn add_vector(&self, text: impl Into<String>, vector: Embedding) {
        self.state.lock().await.fixed.insert(text.into(), vector);
    }

    /// Make the `index`-th call (0-based) fail with a transport error.
    pub async fn fail_on_batch(&self, index: usize) {
        self.state.lock().await.fail_on_batch = Some(index);
    }

    /// Make the `index`-th call return one vector fewer than requested.
    pub async fn short_batch_on(&self, index: usize) {
        self.state.lock().await.short_on_batch = Some(index);
    }

    /// Every batch received so far, including failed ones.
    pub async fn batches(&self) -> Vec<Vec<String>> {
        self.state.lock().await.batches.clone()
    }

    /// Deterministic fallback vector for `text`.
    pub fn vector_for(text: &str, dimension: usize) -> Embedding {
        let seed = text
            .bytes()
            .fold(17u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        (0..dimension)
            .map(|i| {
                // splitmix64 finalizer
                let mut z = seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
                z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
                z ^= z >> 31;
                ((z % 1000) as f64 + 1.0) / 1000.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-embedding"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut state = self.state.lock().await;
        let call = state.batches.len();
        state.batches.push(texts.to_vec());

        if state.fail_on_batch == Some(call) {
            return Err(RagError::TransportFailure(format!(
                "mock failure on batch {}",
                call
            )));
        }

        let mut vectors: Vec<Embedding> = texts
            .iter()
            .map(|text| {
                state
                    .fixed
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| Self::vector_for(text, self.dimension))
            })
            .collect();

        if state.short_on_batch == Some(call) {
            vectors.pop();
        }

        Ok(vectors)
    }
}
