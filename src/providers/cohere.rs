//! Cohere embeddings provider.
//!
//! # Environment Variables
//!
//! - `COHERE_API_KEY`: Your Cohere API key (required)
//! - `COHERE_BASE_URL`: Custom API base URL (optional)
//! - `COHERE_EMBEDDING_MODEL`: Model to use (optional)
//!
//! # Example
//!
//! ```rust,ignore
//! use edgequake_rag::providers::CohereProvider;
//!
//! let provider = CohereProvider::from_env()?;
//! let embeddings = provider.embed(&["Hello, world!".to_string()]).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::{
    resolve_api_key, EmbeddingConfig, DEFAULT_EMBEDDING_BASE_URL, DEFAULT_EMBEDDING_KEY_ENV,
    DEFAULT_EMBEDDING_MODEL,
};
use crate::embedding::DEFAULT_EMBED_BATCH_SIZE;
use crate::error::{RagError, Result};
use crate::traits::{Embedding, EmbeddingProvider};

/// Cohere embeddings provider.
#[derive(Debug, Clone)]
pub struct CohereProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_batch_size: usize,
}

/// Builder for CohereProvider
#[derive(Debug, Clone)]
pub struct CohereProviderBuilder {
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_batch_size: usize,
    timeout: Option<Duration>,
}

impl Default for CohereProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            timeout: None,
        }
    }
}

impl CohereProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL (the `/v1/embed` path is appended).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Largest batch sent in one request.
    pub fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the CohereProvider
    pub fn build(self) -> Result<CohereProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                RagError::InvalidConfiguration(format!("{} is required", DEFAULT_EMBEDDING_KEY_ENV))
            })?;

        if self.max_batch_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "embedding batch size must be at least 1".to_string(),
            ));
        }

        let mut client = Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client
            .build()
            .map_err(|e| RagError::TransportFailure(e.to_string()))?;

        Ok(CohereProvider {
            client,
            api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self.model,
            max_batch_size: self.max_batch_size,
        })
    }
}

impl CohereProvider {
    /// Create a new CohereProvider from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = resolve_api_key(DEFAULT_EMBEDDING_KEY_ENV)?;

        let base_url = std::env::var("COHERE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_BASE_URL.to_string());
        let model = std::env::var("COHERE_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        CohereProviderBuilder::new()
            .api_key(api_key)
            .base_url(base_url)
            .model(model)
            .build()
    }

    /// Build from the `[embedding]` config section, reading the key from
    /// the configured environment variable.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let mut builder = CohereProviderBuilder::new()
            .api_key(resolve_api_key(&config.api_key_env)?)
            .base_url(&config.base_url)
            .model(&config.model)
            .max_batch_size(config.batch_size);
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    pub fn builder() -> CohereProviderBuilder {
        CohereProviderBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn embed_url(&self) -> String {
        format!("{}/v1/embed", self.base_url)
    }
}

// Request/Response structures for the Cohere embed API

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    texts: Vec<String>,
    embeddings: Vec<Embedding>,
}

#[derive(Debug, Deserialize)]
struct CohereError {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for CohereProvider {
    fn name(&self) -> &str {
        "cohere"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            "Cohere embedding request: {} texts with model {}",
            texts.len(),
            self.model
        );

        let request = EmbedRequest {
            model: &self.model,
            texts,
        };

        let response = self
            .client
            .post(self.embed_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CohereError>(&error_text)
                .map(|e| e.message)
                .unwrap_or(error_text);
            return Err(RagError::RemoteStatusFailure {
                status: status.as_u16().to_string(),
                message,
            });
        }

        let body = response.text().await?;
        let response: EmbedResponse = serde_json::from_str(&body)?;

        debug!(
            "Cohere embedding response: {} embeddings of dimension {}",
            response.embeddings.len(),
            response.embeddings.first().map(|e| e.len()).unwrap_or(0)
        );

        Ok(response.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_server::serve_once;
    use serial_test::serial;

    #[test]
    fn test_builder_defaults() {
        let provider = CohereProviderBuilder::new()
            .api_key("test-key")
            .build()
            .unwrap();

        assert_eq!(provider.name(), "cohere");
        assert_eq!(provider.model(), "embed-english-light-v2.0");
        assert_eq!(provider.max_batch_size(), 20);
        assert_eq!(provider.embed_url(), "https://api.cohere.ai/v1/embed");
    }

    #[test]
    fn test_builder_custom_base_url_strips_slash() {
        let provider = CohereProvider::builder()
            .api_key("k")
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(provider.embed_url(), "http://localhost:8080/v1/embed");
    }

    #[test]
    fn test_builder_missing_api_key() {
        let err = CohereProviderBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("COHERE_API_KEY"));
    }

    #[test]
    fn test_builder_rejects_zero_batch() {
        let result = CohereProviderBuilder::new()
            .api_key("k")
            .max_batch_size(0)
            .build();
        assert!(matches!(result, Err(RagError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_request_wire_format() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let request = EmbedRequest {
            model: "embed-english-light-v2.0",
            texts: &texts,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"model": "embed-english-light-v2.0", "texts": ["a", "b"]})
        );
    }

    #[test]
    fn test_response_decoding() {
        let response: EmbedResponse = serde_json::from_str(
            r#"{"id": "abc", "texts": ["a"], "embeddings": [[0.1, -0.2, 3]], "meta": {}}"#,
        )
        .unwrap();
        assert_eq!(response.embeddings, vec![vec![0.1, -0.2, 3.0]]);
    }

    #[tokio::test]
    async fn test_embed_empty_input() {
        let provider = CohereProviderBuilder::new().api_key("k").build().unwrap();
        assert!(provider.embed(&[]).await.unwrap().is_empty());
    }

    #[test]
    #[serial]
    fn test_from_env_missing_api_key() {
        std::env::remove_var("COHERE_API_KEY");
        let err = CohereProvider::from_env().unwrap_err();
        assert!(err.to_string().contains("COHERE_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_from_config() {
        std::env::set_var("EDGEQUAKE_RAG_COHERE_TEST", "k");
        let config = EmbeddingConfig {
            api_key_env: "EDGEQUAKE_RAG_COHERE_TEST".to_string(),
            batch_size: 8,
            ..Default::default()
        };
        let provider = CohereProvider::from_config(&config).unwrap();
        std::env::remove_var("EDGEQUAKE_RAG_COHERE_TEST");

        assert_eq!(provider.max_batch_size(), 8);
    }

    #[tokio::test]
    async fn test_embed_error_status_becomes_remote_status_failure() {
        let base = serve_once("401 Unauthorized", r#"{"message":"invalid api token"}"#).await;
        let provider = CohereProviderBuilder::new()
            .api_key("k")
            .base_url(base)
            .build()
            .unwrap();

        let err = provider.embed(&["hello".to_string()]).await.unwrap_err();
        match err {
            RagError::RemoteStatusFailure { status, message } => {
                assert_eq!(status, "401");
                assert_eq!(message, "invalid api token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_undecodable_success_body_is_decode_failure() {
        let base = serve_once("200 OK", "not json").await;
        let provider = CohereProviderBuilder::new()
            .api_key("k")
            .base_url(base)
            .build()
            .unwrap();

        let err = provider.embed(&["hello".to_string()]).await.unwrap_err();
        assert!(
            matches!(err, RagError::DecodeFailure(_)),
            "unexpected error: {err:?}"
        );
    }
}
