//! EdgeQuake RAG - Retrieval-Augmented Chat over Hosted Models
//!
//! This crate provides the pieces of a small retrieval-augmented assistant:
//! - Text chunking into overlapping, token-bounded windows
//! - Batched embedding of chunks against a hosted embedding API
//! - Cosine-similarity search over an in-memory, JSON-persisted corpus
//! - Completion requests with typed-output constraints
//! - Intent routing between corpus-grounded answers and plain chat
//!
//! # Providers
//!
//! | Provider | Completions | Embeddings | Notes |
//! |----------|-------------|------------|-------|
//! | Prediction Guard | ✓ | | Typed outputs, toxicity/factuality checks |
//! | Cohere | | ✓ | Batches of at most 20 texts |
//! | Mock | ✓ | ✓ | Testing (no API calls) |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use edgequake_rag::{Embedder, RagAssistant, VectorCorpus};
//! use edgequake_rag::providers::{CohereProvider, PredictionGuardProvider};
//!
//! let corpus = VectorCorpus::load("chunks.json")?;
//! let embedder = Embedder::new(Arc::new(CohereProvider::from_env()?));
//! let completion = Arc::new(PredictionGuardProvider::from_env()?);
//!
//! let mut assistant = RagAssistant::new(completion, embedder, corpus);
//! let answer = assistant.respond("How do I send a change for review?").await?;
//! println!("{}", answer.text);
//! ```
//!
//! # See Also
//!
//! - [`crate::traits`] for provider trait definitions
//! - [`crate::providers`] for concrete implementations
//! - [`crate::config`] for `rag.toml`

pub mod chat;
pub mod chunker;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod postprocess;
pub mod prompts;
pub mod providers;
pub mod rate_limiter;
pub mod retry;
pub mod search;
pub mod traits;

pub use chat::{ChatHistory, ChatTurn};
pub use chunker::{chunk_text, TextChunker};
pub use config::{AssistantConfig, AuthScheme, RagConfig};
pub use corpus::{VectorCorpus, VectorizedChunk};
pub use embedding::Embedder;
pub use error::{RagError, Result, RetryStrategy};
pub use ingest::WebsiteLoader;
pub use orchestrator::{is_exit_command, Answer, RagAssistant, Route};
pub use postprocess::truncate_at_stop_markers;
pub use providers::{CohereProvider, PredictionGuardProvider, TracingProvider};
pub use rate_limiter::{RateLimitedProvider, RateLimiter, RateLimiterConfig};
pub use retry::RetryExecutor;
pub use search::{cosine_similarity, search, SearchHit};
pub use traits::{
    CompletionChoice, CompletionProvider, CompletionRequest, CompletionResponse, Embedding,
    EmbeddingProvider, OutputType, TypedOutput,
};
