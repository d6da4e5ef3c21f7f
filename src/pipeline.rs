//! The end-to-end run: extract, chunk, index, retrieve, generate.
//!
//! Each stage finishes before the next starts and hands its output over as
//! plain data; the [`PipelineReport`] collects what every stage produced.

use crate::extract::{self, ExtractedDocument, ExtractionReport};
use crate::llm::{generate_answer, Answer, GenerationOptions, TextGenerator};
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::Embedder;
use crate::rag::index::KnowledgeBase;
use crate::rag::{chunk_document, retriever};
use crate::types::{AppError, Result, RetrievedChunk};
use crate::utils::toml_config::FolioConfig;
use folio_vector::DistanceMetric;
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument, warn};

const TEXT_PREVIEW_CHARS: usize = 500;

/// Stage parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub chunker: TextChunker,
    pub top_k: usize,
    pub metric: DistanceMetric,
    pub generation: GenerationOptions,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunker: TextChunker::default(),
            top_k: retriever::DEFAULT_TOP_K,
            metric: DistanceMetric::default(),
            generation: GenerationOptions::default(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &FolioConfig) -> Result<Self> {
        let metric = config
            .retrieval
            .metric
            .parse::<DistanceMetric>()
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            chunker: TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?,
            top_k: config.retrieval.top_k,
            metric,
            generation: GenerationOptions::from(&config.generation),
        })
    }
}

/// What a full run produced, stage by stage.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub query: String,
    pub extraction: ExtractionReport,
    /// Start of the extracted text
    pub text_preview: String,
    pub word_count: usize,
    pub chunk_count: usize,
    pub embedding_model: String,
    pub dimensions: usize,
    pub retrieved: Vec<RetrievedChunk>,
    pub answer: Answer,
}

pub struct RagPipeline {
    settings: PipelineSettings,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn TextGenerator>,
}

impl RagPipeline {
    pub fn new(
        settings: PipelineSettings,
        embedder: Box<dyn Embedder>,
        generator: Box<dyn TextGenerator>,
    ) -> Self {
        Self {
            settings,
            embedder,
            generator,
        }
    }

    /// Build the pipeline with the embedding model and generator named in `config`.
    #[cfg(feature = "local-embeddings")]
    pub fn from_config(config: &FolioConfig) -> Result<Self> {
        let settings = PipelineSettings::from_config(config)?;
        let embedder =
            crate::rag::embeddings::EmbeddingService::from_config(&config.embedding)?;
        let generator = crate::llm::Provider::from_config(&config.generation)?.create_generator()?;
        Ok(Self::new(settings, Box::new(embedder), generator))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run every stage on the PDF at `path`.
    #[instrument(skip(self, path), fields(pdf = %path.as_ref().display()))]
    pub async fn run<P: AsRef<Path>>(&mut self, path: P, query: &str) -> Result<PipelineReport> {
        let document = extract::extract_pdf(path)?;
        self.run_document(document, query).await
    }

    /// Run the stages after extraction on an already extracted document.
    pub async fn run_document(
        &mut self,
        document: ExtractedDocument,
        query: &str,
    ) -> Result<PipelineReport> {
        if document.report.skipped_count() > 0 {
            warn!(
                skipped = document.report.skipped_count(),
                "Pages skipped during extraction"
            );
        }
        let word_count = document.word_count();
        let text_preview: String = document.text.chars().take(TEXT_PREVIEW_CHARS).collect();

        let kb = self.index_text(&document.text)?;
        if kb.is_empty() {
            return Err(AppError::EmptyDocument);
        }

        let retrieved = self.retrieve(query, &kb)?;
        let answer = generate_answer(
            self.generator.as_ref(),
            &retrieved,
            query,
            &self.settings.generation,
        )
        .await?;

        Ok(PipelineReport {
            query: query.to_string(),
            extraction: document.report,
            text_preview,
            word_count,
            chunk_count: kb.len(),
            embedding_model: kb.model().to_string(),
            dimensions: kb.dimensions(),
            retrieved,
            answer,
        })
    }

    /// Chunk `text` and build a knowledge base over the chunks.
    pub fn index_text(&mut self, text: &str) -> Result<KnowledgeBase> {
        let chunks = chunk_document(&self.settings.chunker, text);
        info!(
            chunks = chunks.len(),
            chunk_size = self.settings.chunker.chunk_size(),
            overlap = self.settings.chunker.chunk_overlap(),
            "Document chunked"
        );
        KnowledgeBase::build(chunks, self.embedder.as_mut(), self.settings.metric)
    }

    pub fn retrieve(&mut self, query: &str, kb: &KnowledgeBase) -> Result<Vec<RetrievedChunk>> {
        retriever::retrieve(query, self.embedder.as_mut(), kb, self.settings.top_k)
    }
}
