use crate::types::{AppError, Result};

/// Default window size in words.
pub const DEFAULT_CHUNK_SIZE: usize = 500;
/// Default number of words shared by consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Splits text into overlapping fixed-size word windows.
///
/// The window advances by `chunk_size - chunk_overlap` words. Construction
/// fails unless `0 < chunk_size` and `chunk_overlap < chunk_size`, so chunking
/// always terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidConfig(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::with_capacity(self.expected_chunks(words.len()));

        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(words[start..end].join(" "));

            // The window reached the last word; another step would only
            // repeat words already covered.
            if end == words.len() {
                break;
            }
            start += self.step();
        }

        chunks
    }

    /// Number of chunks [`TextChunker::chunk`] produces for `word_count` words.
    pub fn expected_chunks(&self, word_count: usize) -> usize {
        if word_count == 0 {
            0
        } else if word_count <= self.chunk_size {
            1
        } else {
            (word_count - self.chunk_overlap).div_ceil(self.step())
        }
    }
}
