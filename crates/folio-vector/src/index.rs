//! Flat (exhaustive) index.
//!
//! Every query is compared against every stored vector, so results are exact:
//! no approximation, no quantization. Vectors live in one contiguous
//! row-major buffer and each row is paired with the payload inserted with it.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::{IndexStats, Neighbor};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Exact nearest-neighbour index pairing each vector with a payload.
///
/// Row `i` of the vector buffer always belongs to `payloads[i]`; the only way
/// to add a row is [`FlatIndex::insert`], which pushes both together.
#[derive(Debug, Clone)]
pub struct FlatIndex<T> {
    dimensions: usize,
    metric: DistanceMetric,
    vectors: Vec<f32>,
    payloads: Vec<T>,
}

impl<T> FlatIndex<T> {
    /// Create an empty index for vectors of `dimensions` length.
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::Configuration("Dimensions must be > 0".to_string()));
        }

        Ok(Self {
            dimensions,
            metric,
            vectors: Vec::new(),
            payloads: Vec::new(),
        })
    }

    /// Build an index from `(payload, vector)` pairs in one pass.
    ///
    /// Insertion order is preserved: the n-th pair gets position n.
    pub fn build<I>(dimensions: usize, metric: DistanceMetric, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, Vec<f32>)>,
    {
        let mut index = Self::new(dimensions, metric)?;
        for (payload, vector) in entries {
            index.insert(payload, &vector)?;
        }
        debug!(
            count = index.len(),
            dimensions,
            metric = %metric,
            "Built flat index"
        );
        Ok(index)
    }

    /// Get the vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Get the number of entries in the index.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Append a vector with its payload, returning the new entry's position.
    pub fn insert(&mut self, payload: T, vector: &[f32]) -> Result<usize> {
        self.check_vector(vector)?;

        let position = self.payloads.len();
        self.vectors.extend_from_slice(vector);
        self.payloads.push(payload);

        trace!(position, "Inserted vector");
        Ok(position)
    }

    /// Get the payload and vector stored at `position`.
    pub fn get(&self, position: usize) -> Option<(&T, &[f32])> {
        let payload = self.payloads.get(position)?;
        Some((payload, self.row(position)))
    }

    /// Iterate over `(payload, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &[f32])> {
        self.payloads
            .iter()
            .zip(self.vectors.chunks_exact(self.dimensions))
    }

    /// Find the `k` entries closest to `query`.
    ///
    /// Results are sorted by non-decreasing distance; equal distances are
    /// ordered by position. A `k` larger than the index is clamped to its
    /// length, so the result never has more than `len()` entries.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<'_, T>>> {
        self.check_vector(query)?;

        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| (self.metric.distance(query, row), position))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, compare_scored);
            scored.truncate(k);
        }
        scored.sort_by(compare_scored);

        debug!(k, scanned = self.len(), "Flat search completed");

        Ok(scored
            .into_iter()
            .map(|(distance, position)| Neighbor {
                position,
                distance,
                payload: &self.payloads[position],
            })
            .collect())
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            len: self.len(),
            dimensions: self.dimensions,
            metric: self.metric.name(),
            vector_bytes: self.vectors.len() * std::mem::size_of::<f32>(),
        }
    }

    fn row(&self, position: usize) -> &[f32] {
        let start = position * self.dimensions;
        &self.vectors[start..start + self.dimensions]
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "Vector contains NaN or Inf".to_string(),
            ));
        }

        Ok(())
    }
}

fn compare_scored(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}
