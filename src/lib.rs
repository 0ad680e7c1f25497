//! # edgequake-ocr2md
//!
//! Convert PDF documents to Markdown plus extracted images using a remote
//! document-OCR service (Mistral OCR).
//!
//! The service does the recognition and returns, per page, Markdown with
//! `![id](id)` placeholders and the referenced images as base64 data URIs.
//! This crate turns that response into a self-contained bundle on disk:
//!
//! ```text
//! ocr_results_<input-stem>/
//! ├── complete.md          pages joined by one blank line
//! └── images/
//!     └── <image-id>.png   decoded bytes, one per image record
//! ```
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate the local file
//!  ├─ 2. Recognize  upload → signed URL → OCR call
//!  ├─ 3. Decode     base64 data URI → image bytes on disk
//!  ├─ 4. Rewrite    ![id](id) → ![id](images/id.png)
//!  └─ 5. Output     complete.md + images/
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocr2md::{convert, OcrConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OcrConfig::builder()
//!         .api_key(std::env::var("MISTRAL_API_KEY")?)
//!         .build()?;
//!     let output = convert("document.pdf", &config).await?;
//!     println!("Results saved to: {}", output.bundle.root.display());
//!     Ok(())
//! }
//! ```
//!
//! The assembler can also be used on its own with any [`OcrResponse`]:
//!
//! ```rust,no_run
//! use edgequake_ocr2md::{assemble, OcrPage, OcrResponse};
//!
//! let response = OcrResponse::from_pages(vec![
//!     OcrPage::new(0, "# Title\n![img-0](img-0)")
//!         .with_image("img-0", "data:image/png;base64,iVBORw0KGgo="),
//! ]);
//! let bundle = assemble(&response, "ocr_results_demo")?;
//! assert_eq!(bundle.total_images(), 1);
//! # Ok::<(), edgequake_ocr2md::Ocr2MdError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod response;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OcrConfig, OcrConfigBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use convert::{convert, convert_sync, convert_to_dir, recognize};
pub use error::{DecodeError, Ocr2MdError};
pub use output::{AssembledBundle, ConversionOutput, ConversionStats, PageSummary};
pub use pipeline::assemble::{assemble, assemble_with_progress, IMAGES_DIR, MARKDOWN_FILE};
pub use pipeline::decode::decode_image_payload;
pub use pipeline::input::{output_dir_name, OUTPUT_DIR_PREFIX};
pub use pipeline::recognize::{DocumentUpload, MistralOcrClient, RecognitionClient};
pub use pipeline::rewrite::{
    find_unresolved_placeholders, image_relative_path, join_pages, placeholder,
    rewrite_placeholders, PAGE_JOINER,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use response::{OcrImage, OcrPage, OcrResponse, UsageInfo};
