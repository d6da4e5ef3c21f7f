//! Distance metrics for exact nearest-neighbour search.

use std::fmt;

/// Distance metric used to rank indexed vectors against a query.
///
/// Every metric here is distance-based: **lower means closer**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    ///
    /// Range: [0, ∞), where 0 means identical vectors. This is the metric a
    /// flat L2 index uses.
    #[default]
    Euclidean,

    /// Cosine distance (`1 - cosine_similarity`).
    ///
    /// Range: [0, 2], ignores magnitude. A zero vector is treated as maximally
    /// distant from everything except itself.
    Cosine,
}

impl DistanceMetric {
    /// Compute the distance between two vectors of equal length.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" | "l2" | "euclid" => Ok(DistanceMetric::Euclidean),
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

// ============================================================================
// Distance Functions
// ============================================================================

/// Squared L2 distance, accumulated four lanes at a time.
#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    let mut lanes = [0.0f32; 4];

    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_tail = a_chunks.remainder();
    let b_tail = b_chunks.remainder();

    for (ca, cb) in a_chunks.zip(b_chunks) {
        for lane in 0..4 {
            let d = ca[lane] - cb[lane];
            lanes[lane] += d * d;
        }
    }

    let tail: f32 = a_tail
        .iter()
        .zip(b_tail)
        .map(|(x, y)| (x - y) * (x - y))
        .sum();

    lanes.iter().sum::<f32>() + tail
}

#[inline]
fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean(a, b).sqrt()
}

#[inline]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f32, 0.0f32, 0.0f32),
        |(dot, na, nb), (x, y)| (dot + x * y, na + x * x, nb + y * y),
    );

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        if norm_a == norm_b {
            1.0
        } else {
            -1.0
        }
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}
