//! Prediction Guard completions provider.
//!
//! Sends a single JSON `POST` per call to a `/completions` endpoint and decodes
//! the `{id, object, created, choices}` envelope. Requests may carry a typed
//! output block (categorical, pattern, toxicity, factuality, consistency);
//! the matching per-choice `output` is passed through untouched.
//!
//! # Environment Variables
//!
//! - `PREDICTIONGUARD_TOKEN`: API key (required)
//! - `PREDICTIONGUARD_URL`: completions endpoint (optional)
//! - `PREDICTIONGUARD_AUTH_SCHEME`: `bearer` (default) or `api_key_header`
//!
//! # Example
//!
//! ```rust,ignore
//! use edgequake_rag::providers::PredictionGuardProvider;
//! use edgequake_rag::traits::{CompletionProvider, CompletionRequest};
//!
//! let provider = PredictionGuardProvider::from_env()?;
//! let request = CompletionRequest::new("Nous-Hermes-Llama2-13B", "The best joke I know is: ");
//! let response = provider.complete(&request).await?;
//! println!("{}", response.first_choice()?.text);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{
    resolve_api_key, AuthScheme, CompletionConfig, DEFAULT_API_KEY_HEADER,
    DEFAULT_COMPLETION_ENDPOINT, DEFAULT_COMPLETION_KEY_ENV,
};
use crate::error::{RagError, Result};
use crate::retry::RetryExecutor;
use crate::traits::{CompletionProvider, CompletionRequest, CompletionResponse};

/// Longest body excerpt included in log lines and error messages.
const BODY_PREVIEW_CHARS: usize = 500;

/// Prediction Guard completions client.
#[derive(Debug, Clone)]
pub struct PredictionGuardProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    auth: AuthScheme,
    api_key_header: String,
    retry: bool,
}

/// Builder for PredictionGuardProvider
#[derive(Debug, Clone)]
pub struct PredictionGuardProviderBuilder {
    api_key: Option<String>,
    endpoint: String,
    auth: AuthScheme,
    api_key_header: String,
    timeout: Option<Duration>,
    retry: bool,
}

impl Default for PredictionGuardProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_COMPLETION_ENDPOINT.to_string(),
            auth: AuthScheme::Bearer,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout: None,
            retry: false,
        }
    }
}

impl PredictionGuardProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Full URL of the completions endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    /// Header used with [`AuthScheme::ApiKeyHeader`].
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Per-request timeout. Without one the client waits indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Retry transport and status failures with the error's own strategy.
    pub fn retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Build the PredictionGuardProvider
    pub fn build(self) -> Result<PredictionGuardProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                RagError::InvalidConfiguration(format!(
                    "{} is required",
                    DEFAULT_COMPLETION_KEY_ENV
                ))
            })?;

        if self.endpoint.trim().is_empty() {
            return Err(RagError::InvalidConfiguration(
                "completion endpoint must not be empty".to_string(),
            ));
        }

        let mut client = Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client.build().map_err(|e| {
            RagError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(PredictionGuardProvider {
            client,
            api_key,
            endpoint: self.endpoint,
            auth: self.auth,
            api_key_header: self.api_key_header,
            retry: self.retry,
        })
    }
}

impl PredictionGuardProvider {
    /// Create a provider from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = resolve_api_key(DEFAULT_COMPLETION_KEY_ENV)?;

        let endpoint = std::env::var("PREDICTIONGUARD_URL")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_ENDPOINT.to_string());

        let auth = match std::env::var("PREDICTIONGUARD_AUTH_SCHEME") {
            Ok(value) => AuthScheme::parse(&value).ok_or_else(|| {
                RagError::InvalidConfiguration(format!(
                    "unknown PREDICTIONGUARD_AUTH_SCHEME '{}' (expected bearer or api_key_header)",
                    value
                ))
            })?,
            Err(_) => AuthScheme::Bearer,
        };

        PredictionGuardProviderBuilder::new()
            .api_key(api_key)
            .endpoint(endpoint)
            .auth(auth)
            .build()
    }

    /// Build from the `[completion]` config section.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let mut builder = PredictionGuardProviderBuilder::new()
            .api_key(resolve_api_key(&config.api_key_env)?)
            .endpoint(&config.endpoint)
            .auth(config.auth)
            .api_key_header(&config.api_key_header)
            .retry(config.retry);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn builder() -> PredictionGuardProviderBuilder {
        PredictionGuardProviderBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth(&self) -> AuthScheme {
        self.auth
    }

    /// POST the request once and return the raw body of a 2xx response.
    async fn send(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            "Prediction Guard request: url={} model={} prompt_len={}",
            self.endpoint,
            request.model,
            request.prompt.len()
        );

        let builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        let builder = self
            .auth
            .apply(builder, &self.api_key_header, &self.api_key);

        let response = builder.json(request).send().await.map_err(|e| {
            warn!("Network error calling Prediction Guard: {}", e);
            RagError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Prediction Guard response: status={}", status);

        if !status.is_success() {
            warn!(
                "Prediction Guard error: status={} body={}",
                status,
                preview(&body)
            );
            return Err(RagError::RemoteStatusFailure {
                status: status.as_u16().to_string(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    async fn send_with_policy(&self, request: &CompletionRequest) -> Result<String> {
        if self.retry {
            RetryExecutor::new()
                .execute_auto(|| self.send(request))
                .await
        } else {
            self.send(request).await
        }
    }

    /// Send a request and return the response body as untyped JSON.
    pub async fn complete_raw(&self, request: &CompletionRequest) -> Result<JsonValue> {
        let body = self.send_with_policy(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| preview(body))
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[async_trait]
impl CompletionProvider for PredictionGuardProvider {
    fn name(&self) -> &str {
        "predictionguard"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = self.send_with_policy(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                "Failed to parse Prediction Guard response: {} | body: {}",
                e,
                preview(&body)
            );
            RagError::DecodeFailure(format!(
                "Failed to parse completion response: {} | body preview: {}",
                e,
                preview(&body)
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_server::serve_once;
    use serial_test::serial;

    #[test]
    fn test_builder_defaults() {
        let provider = PredictionGuardProviderBuilder::new()
            .api_key("test-key")
            .build()
            .unwrap();

        assert_eq!(provider.name(), "predictionguard");
        assert_eq!(provider.endpoint(), DEFAULT_COMPLETION_ENDPOINT);
        assert_eq!(provider.auth(), AuthScheme::Bearer);
        assert!(!provider.retry);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let err = PredictionGuardProviderBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("PREDICTIONGUARD_TOKEN"));

        let err = PredictionGuardProviderBuilder::new()
            .api_key("")
            .build()
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_builder_rejects_empty_endpoint() {
        let result = PredictionGuardProvider::builder()
            .api_key("k")
            .endpoint("  ")
            .build();
        assert!(matches!(result, Err(RagError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_api_key_header_scheme() {
        let provider = PredictionGuardProvider::builder()
            .api_key("k")
            .endpoint("https://intel.predictionguard.com/completions")
            .auth(AuthScheme::ApiKeyHeader)
            .build()
            .unwrap();

        let request = provider
            .auth
            .apply(
                provider.client.post(provider.endpoint()),
                &provider.api_key_header,
                &provider.api_key,
            )
            .build()
            .unwrap();
        assert_eq!(request.headers().get("x-api-key").unwrap(), "k");
        assert!(request.headers().get("Authorization").is_none());
    }

    #[test]
    fn test_bearer_scheme() {
        let provider = PredictionGuardProvider::builder()
            .api_key("secret")
            .build()
            .unwrap();

        let request = provider
            .auth
            .apply(
                provider.client.post(provider.endpoint()),
                &provider.api_key_header,
                &provider.api_key,
            )
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("Authorization").unwrap(),
            "Bearer secret"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error": "api understands json"}"#), "api understands json");
        assert_eq!(error_message(r#"{"message": "Unauthorized"}"#), "Unauthorized");
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let body = "é".repeat(BODY_PREVIEW_CHARS + 10);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }

    #[test]
    #[serial]
    fn test_from_env_missing_token() {
        std::env::remove_var("PREDICTIONGUARD_TOKEN");
        let err = PredictionGuardProvider::from_env().unwrap_err();
        assert!(err.to_string().contains("PREDICTIONGUARD_TOKEN"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("PREDICTIONGUARD_TOKEN", "env-key");
        std::env::set_var("PREDICTIONGUARD_URL", "http://localhost:9000/completions");
        std::env::set_var("PREDICTIONGUARD_AUTH_SCHEME", "x-api-key");

        let provider = PredictionGuardProvider::from_env();

        std::env::remove_var("PREDICTIONGUARD_TOKEN");
        std::env::remove_var("PREDICTIONGUARD_URL");
        std::env::remove_var("PREDICTIONGUARD_AUTH_SCHEME");

        let provider = provider.unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9000/completions");
        assert_eq!(provider.auth(), AuthScheme::ApiKeyHeader);
    }

    #[test]
    #[serial]
    fn test_from_config() {
        std::env::set_var("EDGEQUAKE_RAG_PG_TEST", "cfg-key");
        let config = CompletionConfig {
            api_key_env: "EDGEQUAKE_RAG_PG_TEST".to_string(),
            retry: true,
            timeout_seconds: Some(5),
            ..Default::default()
        };
        let provider = PredictionGuardProvider::from_config(&config);
        std::env::remove_var("EDGEQUAKE_RAG_PG_TEST");

        let provider = provider.unwrap();
        assert!(provider.retry);
        assert_eq!(provider.api_key, "cfg-key");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_failure() {
        let provider = PredictionGuardProvider::builder()
            .api_key("k")
            .endpoint("http://127.0.0.1:9/completions")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let err = provider
            .complete(&CompletionRequest::new("m", "p"))
            .await
            .unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_error_status_becomes_remote_status_failure() {
        let base = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#).await;
        let provider = PredictionGuardProvider::builder()
            .api_key("k")
            .endpoint(format!("{}/completions", base))
            .build()
            .unwrap();

        let err = provider
            .complete(&CompletionRequest::new("m", "p"))
            .await
            .unwrap_err();
        match &err {
            RagError::RemoteStatusFailure { status, message } => {
                assert_eq!(status, "401");
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.user_description().contains("401"));
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_decode_failure() {
        let base = serve_once("200 OK", "not json").await;
        let provider = PredictionGuardProvider::builder()
            .api_key("k")
            .endpoint(format!("{}/completions", base))
            .build()
            .unwrap();

        let err = provider
            .complete(&CompletionRequest::new("m", "p"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, RagError::DecodeFailure(ref msg) if msg.contains("not json")),
            "unexpected error: {err:?}"
        );
    }
}
