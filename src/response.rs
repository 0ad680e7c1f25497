//! The OCR response model consumed by the assembler.
//!
//! These structs are the only shape [`crate::assemble`] depends on. The
//! recognition client converts whatever its transport returns into an
//! [`OcrResponse`] so the assembler never sees HTTP or JSON details.

use serde::{Deserialize, Serialize};

/// Structured result of recognising one document.
///
/// `pages` is in reading order. An empty `pages` list is valid and produces
/// an empty `complete.md`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub pages: Vec<OcrPage>,

    /// Model that produced the response, when the service reports it.
    #[serde(default)]
    pub model: Option<String>,

    /// Usage counters reported by the service.
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

/// One recognised page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    /// 0-based page index as reported by the service. Informational only.
    pub index: usize,

    /// Page text with `![id](id)` placeholders for embedded images.
    pub markdown: String,

    /// Images referenced by this page. Ids are unique within the page only.
    #[serde(default)]
    pub images: Vec<OcrImage>,
}

/// An image extracted from a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrImage {
    /// Placeholder key and output file stem, e.g. `img-0.jpeg`.
    pub id: String,

    /// `<metadata>,<base64 payload>`; only the part after the first comma
    /// carries image bytes.
    pub encoded_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub pages_processed: u32,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}

impl OcrResponse {
    /// Build a response from pages alone.
    pub fn from_pages(pages: Vec<OcrPage>) -> Self {
        Self {
            pages,
            model: None,
            usage: None,
        }
    }

    /// Number of image records across all pages.
    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }
}

impl OcrPage {
    pub fn new(index: usize, markdown: impl Into<String>) -> Self {
        Self {
            index,
            markdown: markdown.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, id: impl Into<String>, encoded_data: impl Into<String>) -> Self {
        self.images.push(OcrImage {
            id: id.into(),
            encoded_data: encoded_data.into(),
        });
        self
    }
}
