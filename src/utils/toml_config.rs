//! TOML-based configuration for folio
//!
//! Every section is optional; a missing key takes the same default the
//! pipeline uses when run without a config file (`folio.toml`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Root configuration structure loaded from folio.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= Document Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// PDF to process when `--pdf` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_query")]
    pub query: String,
}

fn default_query() -> String {
    "What is this document about?".to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: None,
            query: default_query(),
        }
    }
}

// ============= Chunking Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in words
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Words shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    crate::rag::chunker::DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    crate::rag::chunker::DEFAULT_CHUNK_OVERLAP
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

// ============= Embedding Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_true")]
    pub show_download_progress: bool,

    /// Where model files are cached (fastembed's default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            show_download_progress: true,
            cache_dir: None,
        }
    }
}

// ============= Retrieval Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// "euclidean" or "cosine"
    #[serde(default = "default_metric")]
    pub metric: String,
}

fn default_top_k() -> usize {
    2
}

fn default_metric() -> String {
    "euclidean".to_string()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            metric: default_metric(),
        }
    }
}

// ============= Generation Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable that overrides `base_url` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url_env: Option<String>,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default = "default_true")]
    pub do_sample: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i32>,

    /// Total length limit; ignored when `max_new_tokens` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default = "default_true")]
    pub truncation: bool,

    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u32,

    #[serde(default = "default_true")]
    pub return_full_text: bool,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_generation_model() -> String {
    "llama3.2:1b".to_string()
}

fn default_max_new_tokens() -> u32 {
    50
}

fn default_max_context_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            base_url_env: None,
            model: default_generation_model(),
            max_new_tokens: default_max_new_tokens(),
            do_sample: true,
            temperature: None,
            top_p: None,
            top_k: None,
            seed: None,
            max_length: None,
            truncation: true,
            max_context_tokens: default_max_context_tokens(),
            return_full_text: true,
        }
    }
}

impl GenerationConfig {
    /// Server URL, taking `base_url_env` into account
    pub fn resolved_base_url(&self) -> String {
        self.base_url_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ============= Errors =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl FolioConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Like [`FolioConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(_)) => {
                debug!(path = %path.as_ref().display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: FolioConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        self.retrieval
            .metric
            .parse::<folio_vector::DistanceMetric>()
            .map_err(|e| ConfigError::ValidationError(format!("retrieval.metric: {}", e)))?;

        self.embedding
            .model
            .parse::<crate::rag::embeddings::EmbeddingModelType>()
            .map_err(|e| ConfigError::ValidationError(format!("embedding.model: {}", e)))?;

        let generation = &self.generation;
        generation
            .provider
            .parse::<crate::llm::ProviderKind>()
            .map_err(|e| ConfigError::ValidationError(format!("generation.provider: {}", e)))?;
        if generation.max_new_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_new_tokens must be at least 1".to_string(),
            ));
        }
        if i32::try_from(generation.max_new_tokens).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "generation.max_new_tokens ({}) must not exceed {}",
                generation.max_new_tokens,
                i32::MAX
            )));
        }
        if generation.truncation && generation.max_new_tokens >= generation.max_context_tokens {
            return Err(ConfigError::ValidationError(format!(
                "generation.max_new_tokens ({}) leaves no room for the prompt in a {}-token context",
                generation.max_new_tokens, generation.max_context_tokens
            )));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                    other
                )))
            }
        }

        Ok(())
    }
}
