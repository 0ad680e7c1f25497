//! Error types for the edgequake-ocr2md library.
//!
//! Every failure is fatal for the run and surfaces as [`Ocr2MdError`] from
//! the top-level `convert*` functions or from [`crate::assemble`]. Nothing is
//! retried or recovered locally; a bundle that was half written when a decode
//! or write error hit stays on disk as-is.
//!
//! The variants are grouped by where the failure comes from:
//!
//! * **Configuration** — a required setting is missing or invalid. Reported
//!   before any file or network activity.
//! * **Input** — the document path is missing or not a regular file.
//! * **Decode** — an image payload in the OCR response is malformed.
//! * **Filesystem** — the output bundle could not be written.
//! * **Service** — the remote OCR call failed. See
//!   [`Ocr2MdError::is_service_error`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-ocr2md library.
#[derive(Debug, Error)]
pub enum Ocr2MdError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// A required setting was not provided.
    #[error("Missing required setting '{key}'.\n{hint}")]
    ConfigMissing { key: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file does not exist: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The path exists but is a directory, socket or similar.
    #[error("Input '{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// An image record carried a payload that could not be decoded.
    #[error("Page {page}: image '{image_id}' could not be decoded: {source}")]
    ImageDecode {
        page: usize,
        image_id: String,
        #[source]
        source: DecodeError,
    },

    /// An image id cannot be used as a file name inside `images/`.
    #[error("Page {page}: image id '{image_id}' is not a valid file name")]
    InvalidImageId { page: usize, image_id: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create a directory or write a file of the output bundle.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Service errors ────────────────────────────────────────────────────
    /// The OCR service rejected the API key (401/403).
    #[error("Authentication error from OCR service during {stage}: {detail}")]
    AuthError { stage: String, detail: String },

    /// The OCR service returned HTTP 429.
    #[error("Rate limit exceeded by OCR service during {stage}")]
    RateLimitExceeded {
        stage: String,
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success HTTP status.
    #[error("OCR service error during {stage} (HTTP {status}): {message}")]
    ApiError {
        stage: String,
        status: u16,
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("OCR service timed out after {secs}s during {stage}\nIncrease --timeout.")]
    ServiceTimeout { stage: String, secs: u64 },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("Could not reach OCR service during {stage}: {reason}\nCheck your internet connection.")]
    ServiceUnavailable { stage: String, reason: String },

    /// The service answered 2xx but the body was not what we expect.
    #[error("Unexpected OCR service response during {stage}: {detail}")]
    InvalidResponse { stage: String, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Ocr2MdError {
    /// `true` when the failure came from the remote OCR service rather than
    /// from local configuration, input, or the filesystem.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Ocr2MdError::AuthError { .. }
                | Ocr2MdError::RateLimitExceeded { .. }
                | Ocr2MdError::ApiError { .. }
                | Ocr2MdError::ServiceTimeout { .. }
                | Ocr2MdError::ServiceUnavailable { .. }
                | Ocr2MdError::InvalidResponse { .. }
        )
    }
}

/// Why an encoded image payload could not be turned into bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No `,` between the data-URI metadata and the payload.
    #[error("missing ',' between data-URI metadata and payload")]
    MissingSeparator,

    /// The text after the first comma is not standard base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}
