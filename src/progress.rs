//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::OcrConfigBuilder::progress_callback`] to receive events
//! as the document is recognised and each page is assembled.
//!
//! # Example
//!
//! ```rust
//! use edgequake_ocr2md::{ConversionProgressCallback, OcrConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     images: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_assembled(&self, page_num: usize, total_pages: usize, image_count: usize) {
//!         self.images.fetch_add(image_count, Ordering::SeqCst);
//!         eprintln!("Page {}/{} written", page_num, total_pages);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     images: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = OcrConfig::builder()
//!     .api_key("sk-test")
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline at each stage boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in order from a single task, but the
/// assembly events fire on a blocking-pool thread, hence `Send + Sync`.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, right before the document is sent to the OCR service.
    ///
    /// # Arguments
    /// * `file_name` — name the document is uploaded under
    /// * `bytes`     — document size
    fn on_recognition_start(&self, file_name: &str, bytes: u64) {
        let _ = (file_name, bytes);
    }

    /// Called once the service has returned a response.
    fn on_recognition_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's images are on disk and its Markdown rewritten.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in the response
    /// * `image_count` — images written for this page
    fn on_page_assembled(&self, page_num: usize, total_pages: usize, image_count: usize) {
        let _ = (page_num, total_pages, image_count);
    }

    /// Called once after `complete.md` has been written.
    fn on_conversion_complete(&self, total_pages: usize, total_images: usize) {
        let _ = (total_pages, total_images);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OcrConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
