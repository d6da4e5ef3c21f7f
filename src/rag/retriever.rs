use crate::rag::embeddings::Embedder;
use crate::rag::index::KnowledgeBase;
use crate::types::{AppError, Result, RetrievedChunk};
use tracing::{debug, instrument};

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 2;

/// Embed `query` and return the `k` closest chunks, nearest first.
///
/// `embedder` must be the one the knowledge base was built with. A `k` above
/// the number of chunks returns every chunk. Equal distances keep document
/// order.
#[instrument(skip(query, embedder, kb), fields(entries = kb.len()))]
pub fn retrieve(
    query: &str,
    embedder: &mut dyn Embedder,
    kb: &KnowledgeBase,
    k: usize,
) -> Result<Vec<RetrievedChunk>> {
    if k == 0 {
        return Err(AppError::InvalidInput("k must be at least 1".to_string()));
    }
    if kb.is_empty() {
        debug!("Knowledge base is empty, nothing to retrieve");
        return Ok(Vec::new());
    }
    if k > kb.len() {
        debug!(requested = k, available = kb.len(), "Clamping k to chunk count");
    }

    let query_vector = embedder.embed_one(query)?;
    if query_vector.len() != kb.dimensions() {
        return Err(AppError::DimensionMismatch {
            expected: kb.dimensions(),
            actual: query_vector.len(),
        });
    }

    let results: Vec<RetrievedChunk> = kb
        .search(&query_vector, k)?
        .into_iter()
        .enumerate()
        .map(|(i, neighbor)| RetrievedChunk {
            rank: i + 1,
            position: neighbor.position,
            distance: neighbor.distance,
            text: neighbor.payload.text.clone(),
        })
        .collect();

    debug!(returned = results.len(), "Retrieval complete");
    Ok(results)
}
