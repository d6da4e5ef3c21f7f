use crate::types::{AppError, Result};
use std::fmt;
use std::str::FromStr;

/// Turns text into fixed-length vectors.
///
/// Indexing and querying must go through the same embedder so both sides
/// share one vector space.
pub trait Embedder: Send {
    fn model_name(&self) -> &str;

    /// Length of every vector this embedder returns
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per text in input order.
    fn embed(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        match vectors.pop() {
            Some(vector) if vectors.is_empty() => Ok(vector),
            _ => Err(AppError::Embedding(
                "expected exactly one embedding for one input".to_string(),
            )),
        }
    }
}

/// Supported sentence embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingModelType {
    #[default]
    AllMiniLmL6V2,
    AllMiniLmL12V2,
    BgeSmallEnV15,
    BgeBaseEnV15,
    BgeLargeEnV15,
}

impl EmbeddingModelType {
    pub fn dimensions(&self) -> usize {
        match self {
            Self::AllMiniLmL6V2 | Self::AllMiniLmL12V2 | Self::BgeSmallEnV15 => 384,
            Self::BgeBaseEnV15 => 768,
            Self::BgeLargeEnV15 => 1024,
        }
    }

    /// Hugging Face model id
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::AllMiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            Self::AllMiniLmL12V2 => "sentence-transformers/all-MiniLM-L12-v2",
            Self::BgeSmallEnV15 => "BAAI/bge-small-en-v1.5",
            Self::BgeBaseEnV15 => "BAAI/bge-base-en-v1.5",
            Self::BgeLargeEnV15 => "BAAI/bge-large-en-v1.5",
        }
    }

    #[cfg(feature = "local-embeddings")]
    fn to_fastembed(self) -> fastembed::EmbeddingModel {
        use fastembed::EmbeddingModel;
        match self {
            Self::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            Self::AllMiniLmL12V2 => EmbeddingModel::AllMiniLML12V2,
            Self::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            Self::BgeBaseEnV15 => EmbeddingModel::BGEBaseENV15,
            Self::BgeLargeEnV15 => EmbeddingModel::BGELargeENV15,
        }
    }
}

impl fmt::Display for EmbeddingModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_id())
    }
}

impl FromStr for EmbeddingModelType {
    type Err = AppError;

    /// Accepts the Hugging Face id (with or without organisation) or a short alias.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        let name = name.rsplit('/').next().unwrap_or_default();
        match name {
            "all-minilm-l6-v2" | "minilm" | "minilm-l6" => Ok(Self::AllMiniLmL6V2),
            "all-minilm-l12-v2" | "minilm-l12" => Ok(Self::AllMiniLmL12V2),
            "bge-small-en-v1.5" | "bge-small" => Ok(Self::BgeSmallEnV15),
            "bge-base-en-v1.5" | "bge-base" => Ok(Self::BgeBaseEnV15),
            "bge-large-en-v1.5" | "bge-large" => Ok(Self::BgeLargeEnV15),
            _ => Err(AppError::InvalidConfig(format!(
                "unknown embedding model '{}'",
                s
            ))),
        }
    }
}

/// Local ONNX embeddings through fastembed.
#[cfg(feature = "local-embeddings")]
pub struct EmbeddingService {
    model: fastembed::TextEmbedding,
    model_type: EmbeddingModelType,
}

#[cfg(feature = "local-embeddings")]
impl EmbeddingService {
    /// Load `model_type`, downloading it on first use.
    #[tracing::instrument(skip(cache_dir))]
    pub fn new(
        model_type: EmbeddingModelType,
        show_download_progress: bool,
        cache_dir: Option<std::path::PathBuf>,
    ) -> Result<Self> {
        let mut options = fastembed::InitOptions::new(model_type.to_fastembed())
            .with_show_download_progress(show_download_progress);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = fastembed::TextEmbedding::try_new(options)
            .map_err(|e| AppError::Embedding(e.to_string()))?;
        tracing::info!(model = %model_type, dimensions = model_type.dimensions(), "Embedding model ready");

        Ok(Self { model, model_type })
    }

    pub fn from_config(config: &crate::utils::toml_config::EmbeddingConfig) -> Result<Self> {
        let model_type: EmbeddingModelType = config.model.parse()?;
        Self::new(
            model_type,
            config.show_download_progress,
            config.cache_dir.clone(),
        )
    }
}

#[cfg(feature = "local-embeddings")]
impl Embedder for EmbeddingService {
    fn model_name(&self) -> &str {
        self.model_type.model_id()
    }

    fn dimensions(&self) -> usize {
        self.model_type.dimensions()
    }

    fn embed(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|e| AppError::Embedding(e.to_string()))?;

        let expected = self.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(AppError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }

        Ok(vectors)
    }
}
