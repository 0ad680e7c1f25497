//! Result types describing a written output bundle and the run that made it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A persisted output bundle:
///
/// ```text
/// <root>/
/// ├── complete.md
/// └── images/
///     └── <image-id>.png
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledBundle {
    /// Bundle directory, e.g. `ocr_results_report`.
    pub root: PathBuf,
    /// `<root>/complete.md`.
    pub markdown_path: PathBuf,
    /// `<root>/images`.
    pub images_dir: PathBuf,
    /// One entry per input page, in page order.
    pub pages: Vec<PageSummary>,
}

impl AssembledBundle {
    /// Image records written across all pages (colliding ids counted per page).
    pub fn total_images(&self) -> usize {
        self.pages.iter().map(|p| p.image_ids.len()).sum()
    }

    pub fn total_image_bytes(&self) -> u64 {
        self.pages.iter().map(|p| p.image_bytes).sum()
    }

    /// Placeholders left without a matching image record, across all pages.
    pub fn unresolved_placeholders(&self) -> impl Iterator<Item = (usize, &str)> {
        self.pages.iter().flat_map(|p| {
            p.unresolved_placeholders
                .iter()
                .map(move |id| (p.page_num, id.as_str()))
        })
    }
}

/// What the assembler did with one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed position in the response.
    pub page_num: usize,
    /// Ids of the images written for this page, in record order.
    pub image_ids: Vec<String>,
    /// Decoded bytes written for this page.
    pub image_bytes: u64,
    /// Byte length of the rewritten Markdown.
    pub markdown_len: usize,
    /// Ids of `![id](id)` tokens that no image record resolved.
    pub unresolved_placeholders: Vec<String>,
}

/// Timing and size counters for a full conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub total_images: usize,
    pub image_bytes: u64,
    /// Size of the uploaded document.
    pub input_bytes: u64,
    /// Model reported by the service, if any.
    pub model: Option<String>,
    /// Upload + signed URL + OCR call.
    pub recognition_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything [`crate::convert`] returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub bundle: AssembledBundle,
    pub stats: ConversionStats,
}
