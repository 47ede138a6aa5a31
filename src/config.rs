//! Pipeline configuration.
//!
//! Configuration is TOML. The file is loaded from (in order of priority):
//! 1. the path in the `EDGEQUAKE_RAG_CONFIG` environment variable
//! 2. `./rag.toml` (current working directory)
//! 3. built-in defaults, or the caller's fallback via [`RagConfig::load_or`]
//!
//! Credentials never live in the file: each section names the environment
//! variable holding its key, and the variable is read once when the client is
//! built.
//!
//! # Example Configuration
//!
//! ```toml
//! [completion]
//! endpoint = "https://api.predictionguard.com/completions"
//! auth = "bearer"
//! api_key_env = "PREDICTIONGUARD_TOKEN"
//! retry = false
//!
//! [embedding]
//! base_url = "https://api.cohere.ai"
//! model = "embed-english-light-v2.0"
//! api_key_env = "COHERE_API_KEY"
//! batch_size = 20
//!
//! [chunking]
//! chunk_size = 100
//! overlap = 10
//!
//! [assistant]
//! classifier_model = "Nous-Hermes-Llama2-13B"
//! answer_model = "Nous-Hermes-Llama2-13B"
//! chat_model = "WizardCoder"
//! history_window = 3
//! stop_markers = ["#", "import", "Human", "human", "AI:"]
//! ```

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::chat::DEFAULT_HISTORY_WINDOW;
use crate::chunker::{TextChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::embedding::DEFAULT_EMBED_BATCH_SIZE;
use crate::error::{RagError, Result};
use crate::postprocess::default_stop_markers;

/// Environment variable pointing at a config file.
pub const CONFIG_PATH_ENV: &str = "EDGEQUAKE_RAG_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rag.toml";

pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://api.predictionguard.com/completions";
/// Endpoint of the deployment that expects the key in a header.
pub const HEADER_KEYED_COMPLETION_ENDPOINT: &str = "https://intel.predictionguard.com/completions";
pub const DEFAULT_COMPLETION_KEY_ENV: &str = "PREDICTIONGUARD_TOKEN";
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.cohere.ai";
pub const DEFAULT_EMBEDDING_MODEL: &str = "embed-english-light-v2.0";
pub const DEFAULT_EMBEDDING_KEY_ENV: &str = "COHERE_API_KEY";
pub const DEFAULT_ANSWER_MODEL: &str = "Nous-Hermes-Llama2-13B";
pub const DEFAULT_CHAT_MODEL: &str = "WizardCoder";

// ============================================================================
// Auth
// ============================================================================

/// How the credential is attached to each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    #[default]
    Bearer,
    /// Raw key in a dedicated header (`x-api-key` unless configured).
    ApiKeyHeader,
}

impl AuthScheme {
    /// Parse `bearer` / `api_key_header` (also accepts `x-api-key`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bearer" => Some(Self::Bearer),
            "api_key_header" | "api-key" | "x-api-key" => Some(Self::ApiKeyHeader),
            _ => None,
        }
    }

    /// Attach `api_key` to `builder` according to this scheme.
    pub fn apply(&self, builder: RequestBuilder, header: &str, api_key: &str) -> RequestBuilder {
        match self {
            Self::Bearer => builder.header("Authorization", format!("Bearer {}", api_key)),
            Self::ApiKeyHeader => builder.header(header, api_key),
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// `[completion]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Full URL of the completions endpoint.
    pub endpoint: String,
    pub auth: AuthScheme,
    /// Header used by [`AuthScheme::ApiKeyHeader`].
    pub api_key_header: String,
    pub api_key_env: String,
    /// No timeout unless set.
    pub timeout_seconds: Option<u64>,
    /// Retry transient failures (off by default).
    pub retry: bool,
    /// Minimum spacing between successive completion calls.
    pub min_interval_ms: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_COMPLETION_ENDPOINT.to_string(),
            auth: AuthScheme::Bearer,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            api_key_env: DEFAULT_COMPLETION_KEY_ENV.to_string(),
            timeout_seconds: None,
            retry: false,
            min_interval_ms: None,
        }
    }
}

impl CompletionConfig {
    /// Defaults for the header-keyed deployment: the key goes in
    /// `x-api-key` and requests go to [`HEADER_KEYED_COMPLETION_ENDPOINT`].
    pub fn header_keyed() -> Self {
        Self {
            endpoint: HEADER_KEYED_COMPLETION_ENDPOINT.to_string(),
            auth: AuthScheme::ApiKeyHeader,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval_ms.map(Duration::from_millis)
    }
}

/// `[embedding]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    /// Largest number of texts per embedding request.
    pub batch_size: usize,
    pub timeout_seconds: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key_env: DEFAULT_EMBEDDING_KEY_ENV.to_string(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
            timeout_seconds: None,
        }
    }
}

/// `[chunking]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn chunker(&self) -> Result<TextChunker> {
        TextChunker::new(self.chunk_size, self.overlap)
    }
}

/// `[assistant]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Model answering the yes/no "is this a question" classification.
    pub classifier_model: String,
    /// Model answering from retrieved context.
    pub answer_model: String,
    /// Model for conversational replies.
    pub chat_model: String,
    /// Recent turns included in the chat prompt.
    pub history_window: usize,
    pub stop_markers: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            classifier_model: DEFAULT_ANSWER_MODEL.to_string(),
            answer_model: DEFAULT_ANSWER_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            stop_markers: default_stop_markers(),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub completion: CompletionConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub assistant: AssistantConfig,
}

impl RagConfig {
    /// Load configuration using the lookup order described in the module docs.
    pub fn load() -> Result<Self> {
        Self::load_or(Self::default())
    }

    /// Like [`RagConfig::load`], but returns `fallback` when no config file
    /// is found.
    pub fn load_or(fallback: Self) -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!("Loading config from {} ({})", path, CONFIG_PATH_ENV);
            return Self::from_file(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            info!("Loading config from ./{}", DEFAULT_CONFIG_FILE);
            return Self::from_file(local);
        }

        debug!("No config file found, using fallback configuration");
        Ok(fallback)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document. Missing sections use defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            RagError::InvalidConfiguration(format!("failed to parse TOML config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            RagError::InvalidConfiguration(format!("failed to serialize config: {}", e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.completion.endpoint.trim().is_empty() {
            return Err(RagError::InvalidConfiguration(
                "completion.endpoint must not be empty".to_string(),
            ));
        }
        if self.embedding.base_url.trim().is_empty() {
            return Err(RagError::InvalidConfiguration(
                "embedding.base_url must not be empty".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        self.chunking.chunker()?;
        Ok(())
    }
}

/// Read a credential from the environment.
pub fn resolve_api_key(env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(RagError::InvalidConfiguration(format!(
            "{} environment variable is required. Set it with: export {}=your-api-key",
            env_var, env_var
        ))),
    }
}
