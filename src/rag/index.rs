use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Chunk, Result};
use folio_vector::{DistanceMetric, FlatIndex, IndexStats, Neighbor};
use tracing::{debug, info, instrument};

/// Chunks of one document paired with their embeddings.
///
/// Built once from the full chunk sequence and read-only afterwards.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    index: FlatIndex<Chunk>,
    model: String,
}

impl KnowledgeBase {
    /// Embed every chunk in one batch and index the results.
    #[instrument(skip(chunks, embedder), fields(count = chunks.len(), model = embedder.model_name()))]
    pub fn build(
        chunks: Vec<Chunk>,
        embedder: &mut dyn Embedder,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let dimensions = embedder.dimensions();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&texts)?
        };

        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let index = FlatIndex::build(dimensions, metric, chunks.into_iter().zip(embeddings))?;
        let kb = Self {
            index,
            model: embedder.model_name().to_string(),
        };

        let stats = kb.stats();
        info!(
            entries = stats.len,
            dimensions = stats.dimensions,
            metric = stats.metric,
            vector_bytes = stats.vector_bytes,
            "Knowledge base built"
        );
        Ok(kb)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.index.metric()
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// Name of the model the stored embeddings came from
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn chunk(&self, position: usize) -> Option<&Chunk> {
        self.index.get(position).map(|(chunk, _)| chunk)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.index.iter().map(|(chunk, _)| chunk)
    }

    /// Nearest chunks to an already embedded query.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<'_, Chunk>>> {
        debug!(k, entries = self.len(), "Searching knowledge base");
        Ok(self.index.search(query, k)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds each text as `[word count, first byte]`.
    struct Shape {
        dims: usize,
        short_by: usize,
    }

    impl Embedder for Shape {
        fn model_name(&self) -> &str {
            "shape"
        }
        fn dimensions(&self) -> usize {
            self.dims
        }
        fn embed(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .skip(self.short_by)
                .map(|t| {
                    vec![
                        t.split_whitespace().count() as f32,
                        t.bytes().next().unwrap_or(0) as f32,
                    ]
                })
                .collect())
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(position, text)| Chunk {
                position,
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_build_keeps_order() {
        let mut embedder = Shape { dims: 2, short_by: 0 };
        let kb = KnowledgeBase::build(
            chunks(&["a b c", "d", "e f"]),
            &mut embedder,
            DistanceMetric::Euclidean,
        )
        .unwrap();

        assert_eq!(kb.len(), 3);
        assert_eq!(kb.dimensions(), 2);
        assert_eq!(kb.model(), "shape");
        assert_eq!(kb.chunk(1).unwrap().text, "d");
        let positions: Vec<usize> = kb.chunks().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        let stats = kb.stats();
        assert_eq!(stats.len, 3);
        assert_eq!(stats.dimensions, 2);
        assert_eq!(stats.metric, "euclidean");
        assert_eq!(stats.vector_bytes, 3 * 2 * 4);
    }

    #[test]
    fn test_wrong_vector_length_fails() {
        let mut embedder = Shape { dims: 3, short_by: 0 };
        let result = KnowledgeBase::build(chunks(&["a"]), &mut embedder, DistanceMetric::Euclidean);
        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_missing_vectors_fail() {
        let mut embedder = Shape { dims: 2, short_by: 1 };
        let result =
            KnowledgeBase::build(chunks(&["a", "b"]), &mut embedder, DistanceMetric::Euclidean);
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[test]
    fn test_empty_chunks_build_empty_index() {
        let mut embedder = Shape { dims: 2, short_by: 0 };
        let kb = KnowledgeBase::build(Vec::new(), &mut embedder, DistanceMetric::Euclidean).unwrap();
        assert!(kb.is_empty());
        assert!(kb.search(&[0.0, 0.0], 2).unwrap().is_empty());
    }
}
