//! PDF text extraction
//!
//! Pages are read one by one. A page that yields no text, or whose text cannot
//! be decoded, is skipped and recorded in the [`ExtractionReport`]; it never
//! fails the whole document.

use crate::types::{AppError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Anything that can hand out text page by page.
pub trait PageSource {
    /// 1-based page numbers in document order
    fn page_numbers(&self) -> Vec<u32>;

    fn page_text(&self, page: u32) -> Result<String>;
}

/// A parsed PDF held in memory.
pub struct PdfDocument {
    inner: lopdf::Document,
}

impl PdfDocument {
    /// Read and parse the file at `path`.
    ///
    /// The file is read in a single call and closed before parsing starts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::Extraction(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("not a readable PDF: {}", e)))?;
        Ok(Self { inner })
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }
}

impl PageSource for PdfDocument {
    fn page_numbers(&self) -> Vec<u32> {
        self.inner.get_pages().keys().copied().collect()
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.inner
            .extract_text(&[page])
            .map_err(|e| AppError::Extraction(e.to_string()))
    }
}

/// Why a page contributed no text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SkipReason {
    Empty,
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => f.write_str("no extractable text"),
            SkipReason::Failed(message) => write!(f, "extraction failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Extracted { page: u32, chars: usize },
    Skipped { page: u32, reason: SkipReason },
}

impl PageOutcome {
    pub fn page(&self) -> u32 {
        match self {
            PageOutcome::Extracted { page, .. } | PageOutcome::Skipped { page, .. } => *page,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PageOutcome::Skipped { .. })
    }
}

/// Per-page outcomes of one extraction, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub pages: Vec<PageOutcome>,
}

impl ExtractionReport {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn extracted_count(&self) -> usize {
        self.pages.len() - self.skipped_count()
    }

    pub fn skipped_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_skipped()).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PageOutcome> {
        self.pages.iter().filter(|p| p.is_skipped())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    /// Page texts, each prefixed with a `--- Page N ---` line
    pub text: String,
    pub report: ExtractionReport,
}

impl ExtractedDocument {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

pub fn page_marker(page: u32) -> String {
    format!("--- Page {} ---", page)
}

/// Concatenate the text of every page that has some.
#[instrument(skip(source))]
pub fn extract_pages(source: &dyn PageSource) -> ExtractedDocument {
    let mut text = String::new();
    let mut pages = Vec::new();

    for page in source.page_numbers() {
        let outcome = match source.page_text(page) {
            Ok(page_text) => {
                let page_text = page_text.trim();
                if page_text.is_empty() {
                    PageOutcome::Skipped {
                        page,
                        reason: SkipReason::Empty,
                    }
                } else {
                    text.push_str(&page_marker(page));
                    text.push('\n');
                    text.push_str(page_text);
                    text.push('\n');
                    PageOutcome::Extracted {
                        page,
                        chars: page_text.chars().count(),
                    }
                }
            }
            Err(e) => PageOutcome::Skipped {
                page,
                reason: SkipReason::Failed(e.to_string()),
            },
        };

        debug!(?outcome, "Page processed");
        pages.push(outcome);
    }

    let report = ExtractionReport { pages };
    if report.skipped_count() > 0 {
        warn!(
            skipped = report.skipped_count(),
            total = report.total_pages(),
            "Some pages produced no text"
        );
    }
    info!(
        pages = report.extracted_count(),
        chars = text.len(),
        "Text extracted"
    );

    ExtractedDocument { text, report }
}

/// Open the PDF at `path` and extract its text.
pub fn extract_pdf<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument> {
    let document = PdfDocument::open(path)?;
    Ok(extract_pages(&document))
}
