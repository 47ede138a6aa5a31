//! Batched embedding of text chunks.
//!
//! Embedding APIs cap the number of texts per request. [`Embedder`] splits an
//! arbitrary-length input into consecutive batches no larger than the cap,
//! sends them one after another, and concatenates the vectors so that output
//! `i` always belongs to input `i`.
//!
//! Any batch failure aborts the whole run: no partial result is returned.

use std::sync::Arc;
use tracing::debug;

use crate::corpus::VectorCorpus;
use crate::error::{RagError, Result};
use crate::traits::{Embedding, EmbeddingProvider};

/// Batch ceiling of the hosted embedding API.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 20;

const EMBED_OPERATION: &str = "embed";

/// Splits embedding work into bounded, ordered batches.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Embedder {
    /// Use the provider's own batch ceiling.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let batch_size = provider.max_batch_size().max(1);
        Self {
            provider,
            batch_size,
        }
    }

    /// Override the batch ceiling.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "embedding batch size must be at least 1".to_string(),
            ));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed every text, preserving order.
    ///
    /// An empty input makes no remote call. A failed batch, or a batch that
    /// comes back with the wrong number of vectors, fails the whole call with
    /// [`RagError::RemoteCallFailed`].
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_index, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!(
                "Embedding batch {} ({} texts) with {}",
                batch_index,
                batch.len(),
                self.provider.model()
            );

            let vectors = self
                .provider
                .embed(batch)
                .await
                .map_err(|e| RagError::remote_call(EMBED_OPERATION, e))?;

            if vectors.len() != batch.len() {
                return Err(RagError::remote_call(
                    EMBED_OPERATION,
                    RagError::DecodeFailure(format!(
                        "expected {} embeddings for batch {}, got {}",
                        batch.len(),
                        batch_index,
                        vectors.len()
                    )),
                ));
            }

            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, query: &str) -> Result<Embedding> {
        let mut vectors = self.embed(&[query.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            RagError::remote_call(
                EMBED_OPERATION,
                RagError::DecodeFailure("empty embedding result".to_string()),
            )
        })
    }

    /// Embed `chunks` and pair each with its vector.
    pub async fn vectorize(&self, chunks: Vec<String>) -> Result<VectorCorpus> {
        let vectors = self.embed(&chunks).await?;
        Ok(VectorCorpus::from_pairs(chunks, vectors))
    }
}
