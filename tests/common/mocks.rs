//! Mock implementations for testing.
//!
//! In-process stand-ins for the embedding model, the generator and the PDF
//! page source, shared by the integration tests.

use async_trait::async_trait;
use folio::extract::PageSource;
use folio::llm::{GenerationOptions, TextGenerator};
use folio::rag::embeddings::Embedder;
use folio::types::{AppError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Deterministic bag-of-words embedder.
///
/// Each lowercase word is hashed (FNV-1a) into one of `dims` buckets and the
/// bucket counts, scaled to unit length like a sentence embedder's output,
/// form the vector. Identical texts always get identical vectors, and texts
/// sharing words end up close together whatever their length.
#[derive(Clone)]
pub struct HashEmbedder {
    dims: usize,
    batches: Arc<AtomicUsize>,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            batches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `embed` calls made so far, across clones.
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dims];
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            vector[(fnv1a(&word) % self.dims as u64) as usize] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "mock-hash"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

/// Embedder that always fails.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn embed(&mut self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::Embedding("Mock embedding failure".to_string()))
    }
}

/// Mock generator with a fixed completion that records every call.
#[derive(Clone)]
pub struct MockGenerator {
    response: String,
    should_fail: bool,
    calls: Arc<Mutex<Vec<(String, GenerationOptions)>>>,
}

impl MockGenerator {
    /// Create a new mock generator that returns the given completion.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock generator that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Prompts and options received so far.
    pub fn calls(&self) -> Vec<(String, GenerationOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-generator"
    }
}

/// Page source backed by strings; `None` is a page whose extraction fails.
pub struct MemoryPages(pub Vec<Option<String>>);

impl MemoryPages {
    pub fn from_texts(pages: &[&str]) -> Self {
        Self(pages.iter().map(|p| Some(p.to_string())).collect())
    }
}

impl PageSource for MemoryPages {
    fn page_numbers(&self) -> Vec<u32> {
        (1..=self.0.len() as u32).collect()
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.0
            .get(page as usize - 1)
            .cloned()
            .flatten()
            .ok_or_else(|| AppError::Extraction(format!("page {} is an image", page)))
    }
}
