//! Common types for folio-vector.

/// One search hit: a borrowed payload with its insertion position and distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a, T> {
    /// Insertion position of the entry (0-based).
    pub position: usize,
    /// Distance to the query under the index metric (lower is closer).
    pub distance: f32,
    /// The payload stored alongside the vector.
    pub payload: &'a T,
}

/// Statistics about an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    /// Number of stored entries.
    pub len: usize,
    /// Dimensionality of every stored vector.
    pub dimensions: usize,
    /// Metric name.
    pub metric: &'static str,
    /// Bytes used by vector storage.
    pub vector_bytes: usize,
}
