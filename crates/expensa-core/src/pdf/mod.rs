//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::PdfError;

/// How much usable text a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Contains extractable text.
    Text,
    /// Too little text to work with (likely a scan or a broken file).
    Empty,
}

impl ContentKind {
    /// Classify `text` against the configured minimum length.
    pub fn of(text: &str, min_text_length: usize) -> Self {
        if text.trim().len() >= min_text_length {
            ContentKind::Text
        } else {
            ContentKind::Empty
        }
    }
}

/// Text read from a document.
#[derive(Debug, Clone)]
pub struct DocumentContent {
    pub kind: ContentKind,
    pub text: String,
    /// Number of pages; zero when the PDF could not be read.
    pub pages: u32,
}

impl DocumentContent {
    fn empty() -> Self {
        Self {
            kind: ContentKind::Empty,
            text: String::new(),
            pages: 0,
        }
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Extract text from PDF bytes, returning an empty string on any failure.
///
/// Corrupt or encrypted documents are logged and treated as having no text,
/// so field extraction reports sentinels instead of aborting.
pub fn extract_text_lossy(data: &[u8]) -> String {
    extract_content_lossy(data, 0).text
}

/// Like [`extract_text_lossy`], also reporting the page count and content kind.
pub fn extract_content_lossy(data: &[u8], min_text_length: usize) -> DocumentContent {
    let mut extractor = PdfExtractor::new();
    let content = extractor
        .load(data)
        .and_then(|_| extractor.extract_content(min_text_length));
    match content {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not extract PDF text: {}", e);
            DocumentContent::empty()
        }
    }
}

/// Read the content of a document on disk.
///
/// `.txt` files are read as-is, with invalid UTF-8 replaced; anything else
/// is treated as a PDF. Only failing to read the file itself is an error.
pub fn document_content(path: &Path, min_text_length: usize) -> std::io::Result<DocumentContent> {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));

    let data = std::fs::read(path)?;
    if !is_text {
        return Ok(extract_content_lossy(&data, min_text_length));
    }

    let text = match String::from_utf8(data) {
        Ok(text) => text,
        Err(e) => {
            debug!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    Ok(DocumentContent {
        kind: ContentKind::of(&text, min_text_length),
        text,
        pages: 1,
    })
}

/// Read the text of a document on disk. See [`document_content`].
pub fn document_text(path: &Path) -> std::io::Result<String> {
    document_content(path, 0).map(|content| content.text)
}
