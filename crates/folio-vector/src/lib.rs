//! # folio-vector
//!
//! A small, pure-Rust exact nearest-neighbour index used by folio.
//!
//! Every search scans all stored vectors (flat index semantics), so results
//! are exact and deterministic: ties in distance are broken by insertion
//! position. Each stored vector is paired with a payload, which keeps the
//! vector/payload alignment inside the index instead of in two parallel lists.
//!
//! ## Quick Start
//!
//! ```rust
//! use folio_vector::{DistanceMetric, FlatIndex};
//!
//! let mut index = FlatIndex::new(3, DistanceMetric::Euclidean)?;
//! index.insert("first", &[1.0, 0.0, 0.0])?;
//! index.insert("second", &[0.0, 1.0, 0.0])?;
//!
//! let hits = index.search(&[0.9, 0.1, 0.0], 1)?;
//! assert_eq!(*hits[0].payload, "first");
//! # Ok::<(), folio_vector::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;
pub mod types;

// Re-exports for convenience
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use index::FlatIndex;
pub use types::{IndexStats, Neighbor};
