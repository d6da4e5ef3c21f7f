//! # folio
//!
//! Ask a question about a PDF. folio runs five stages once, top to bottom:
//!
//! 1. **Extract** - page text with `--- Page N ---` markers; unreadable pages are skipped and counted
//! 2. **Chunk** - overlapping fixed-size word windows
//! 3. **Index** - one embedding per chunk in an exact in-memory index
//! 4. **Retrieve** - the k chunks nearest to the query
//! 5. **Generate** - a language model completes a prompt built from those chunks
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use folio::{FolioConfig, RagPipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> folio::Result<()> {
//!     let config = FolioConfig::default();
//!     let mut pipeline = RagPipeline::from_config(&config)?;
//!
//!     let report = pipeline.run("paper.pdf", "What is this document about?").await?;
//!     println!("{}", report.answer.output);
//!     Ok(())
//! }
//! ```
//!
//! Every stage is also usable on its own; see [`extract`], [`rag`] and [`llm`].
//! The embedding and generation boundaries are the [`Embedder`] and
//! [`TextGenerator`] traits, so either model can be swapped out.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Generation through a local Ollama server (default) |
//! | `local-embeddings` | fastembed ONNX embedding models (default) |
//!
//! ## Modules
//!
//! - [`extract`] - PDF text extraction with per-page outcomes
//! - [`rag`] - Chunking, embeddings, knowledge base, retrieval
//! - [`llm`] - Generation options, prompt budgeting, model backends
//! - [`pipeline`] - The end-to-end run
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line parsing and terminal output.
pub mod cli;
/// PDF text extraction.
pub mod extract;
/// Text generation backends and prompt handling.
pub mod llm;
/// End-to-end pipeline.
pub mod pipeline;
/// Chunking, embedding, indexing and retrieval.
pub mod rag;
/// Core types and errors.
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use extract::{extract_pdf, ExtractedDocument, ExtractionReport, PageOutcome, SkipReason};
pub use llm::{GenerationOptions, Provider, TextGenerator};
pub use pipeline::{PipelineReport, PipelineSettings, RagPipeline};
pub use rag::chunker::TextChunker;
pub use rag::embeddings::Embedder;
pub use rag::index::KnowledgeBase;
pub use types::{AppError, Chunk, Result, RetrievedChunk};
pub use utils::toml_config::FolioConfig;
