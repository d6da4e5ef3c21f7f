use serde::{Deserialize, Serialize};

// ============= Pipeline Types =============

/// A contiguous word window of the source document.
///
/// `position` is the chunk's index in document order and never changes after
/// chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub position: usize,
    pub text: String,
}

impl Chunk {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A chunk returned by retrieval, closest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// 1-based rank in the result list
    pub rank: usize,
    /// Position of the chunk in the original sequence
    pub position: usize,
    /// Distance between the query embedding and the chunk embedding
    pub distance: f32,
    pub text: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("PDF extraction error: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index error: {0}")]
    Index(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document produced no text to index")]
    EmptyDocument,

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<folio_vector::Error> for AppError {
    fn from(err: folio_vector::Error) -> Self {
        match err {
            folio_vector::Error::DimensionMismatch { expected, actual } => {
                AppError::DimensionMismatch { expected, actual }
            }
            other => AppError::Index(other.to_string()),
        }
    }
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_dimension_error_keeps_sizes() {
        let err: AppError = folio_vector::Error::DimensionMismatch {
            expected: 384,
            actual: 768,
        }
        .into();
        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 384,
                actual: 768
            }
        ));
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 768");
    }

    #[test]
    fn test_other_vector_errors_become_index_errors() {
        let err: AppError = folio_vector::Error::InvalidVector("NaN".to_string()).into();
        assert!(matches!(err, AppError::Index(_)));
    }

    #[test]
    fn test_chunk_word_count() {
        let chunk = Chunk {
            position: 0,
            text: "one two  three".to_string(),
        };
        assert_eq!(chunk.word_count(), 3);
    }
}
