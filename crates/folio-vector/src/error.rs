//! Error types for folio-vector.

use thiserror::Error;

/// Result type for folio-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in folio-vector operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// Invalid vector (e.g. contains NaN or infinity).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
