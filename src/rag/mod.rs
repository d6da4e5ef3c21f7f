//! Retrieval half of the pipeline
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Overlapping word-window chunking
//! - [`rag::embeddings`](crate::rag::embeddings) - The [`Embedder`](crate::rag::embeddings::Embedder) boundary and fastembed models
//! - [`rag::index`](crate::rag::index) - Exact in-memory knowledge base over the chunks
//! - [`rag::retriever`](crate::rag::retriever) - Top-k lookup for a query
//!
//! # Flow
//!
//! 1. **Chunking** - Document text is split into word windows
//! 2. **Indexing** - Every chunk is embedded in one batch and stored with its vector
//! 3. **Retrieval** - The query is embedded and its nearest chunks returned
//!
//! # Example
//!
//! ```ignore
//! use folio::rag::{chunker::TextChunker, embeddings::EmbeddingService, index::KnowledgeBase, retriever};
//!
//! let chunker = TextChunker::new(500, 50)?;
//! let chunks = chunk_document(&chunker, &document_text);
//!
//! let mut embedder = EmbeddingService::new(Default::default(), true, None)?;
//! let kb = KnowledgeBase::build(chunks, &mut embedder, Default::default())?;
//! let hits = retriever::retrieve("What is this about?", &mut embedder, &kb, 2)?;
//! ```

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod retriever;

use crate::types::Chunk;
use chunker::TextChunker;

/// Chunk `text` and tag each piece with its position.
pub fn chunk_document(chunker: &TextChunker, text: &str) -> Vec<Chunk> {
    chunker
        .chunk(text)
        .into_iter()
        .enumerate()
        .map(|(position, text)| Chunk { position, text })
        .collect()
}
