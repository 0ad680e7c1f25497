//! Conversion entry points: recognise a document, then assemble the bundle.
//!
//! Every failure is returned as `Err(Ocr2MdError)`; nothing is printed or
//! swallowed here. Whether a service failure should end the process is the
//! caller's decision.

use crate::config::OcrConfig;
use crate::error::Ocr2MdError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::assemble::assemble_with_progress;
use crate::pipeline::input::{self, output_dir_name, ResolvedInput};
use crate::pipeline::recognize::{DocumentUpload, MistralOcrClient, RecognitionClient};
use crate::response::OcrResponse;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a local PDF into an output bundle.
///
/// The bundle goes to `config.output_dir`, or to `ocr_results_<stem>` in
/// the working directory when that is unset.
///
/// # Errors
/// * configuration — no API key and no injected client
/// * input — path missing, unreadable, or not a regular file
/// * service — any failure of upload, signed URL or OCR call
/// * decode / filesystem — see [`crate::assemble`]
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    let input_path = input_path.as_ref();
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(output_dir_name(input_path)));
    convert_to_dir(input_path, output_dir, config).await
}

/// Convert a local PDF into a bundle at exactly `output_dir`.
pub async fn convert_to_dir(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    let total_start = Instant::now();
    let output_dir = output_dir.as_ref().to_path_buf();

    // ── Step 1: Client (config errors surface before any I/O) ────────────
    let client = resolve_client(config)?;

    // ── Step 2: Input ────────────────────────────────────────────────────
    let resolved = input::resolve_input(input_path.as_ref())?;
    info!("Starting OCR conversion: {}", resolved.path.display());

    // ── Step 3: Recognise ────────────────────────────────────────────────
    let recognition_start = Instant::now();
    let (response, input_bytes) = recognize_resolved(client.as_ref(), &resolved, config).await?;
    let recognition_duration_ms = recognition_start.elapsed().as_millis() as u64;

    // ── Step 4: Assemble ─────────────────────────────────────────────────
    let assemble_start = Instant::now();
    let model = response.model.clone();
    let total_pages = response.pages.len();
    let progress = config.progress_callback.clone();
    let bundle = tokio::task::spawn_blocking(move || {
        assemble_with_progress(&response, &output_dir, progress.as_deref())
    })
    .await
    .map_err(|e| Ocr2MdError::Internal(format!("Assembly task panicked: {e}")))??;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        total_pages,
        total_images: bundle.total_images(),
        image_bytes: bundle.total_image_bytes(),
        input_bytes,
        model,
        recognition_duration_ms,
        assemble_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.total_pages, stats.total_images);
    }

    info!(
        "OCR processing is complete: {} pages, {} images → {} ({}ms)",
        stats.total_pages,
        stats.total_images,
        bundle.root.display(),
        stats.total_duration_ms
    );

    Ok(ConversionOutput { bundle, stats })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Ocr2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_path, config))
}

/// Run only the remote step and return the structured response.
///
/// Nothing is written to disk.
pub async fn recognize(
    input_path: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<OcrResponse, Ocr2MdError> {
    let client = resolve_client(config)?;
    let resolved = input::resolve_input(input_path.as_ref())?;
    let (response, _) = recognize_resolved(client.as_ref(), &resolved, config).await?;
    Ok(response)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// An injected client wins; otherwise build a Mistral client from the API key.
fn resolve_client(config: &OcrConfig) -> Result<Arc<dyn RecognitionClient>, Ocr2MdError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }
    Ok(Arc::new(MistralOcrClient::from_config(config)?))
}

async fn recognize_resolved(
    client: &dyn RecognitionClient,
    resolved: &ResolvedInput,
    config: &OcrConfig,
) -> Result<(OcrResponse, u64), Ocr2MdError> {
    let bytes = tokio::fs::read(&resolved.path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => Ocr2MdError::PermissionDenied {
                path: resolved.path.clone(),
            },
            _ => Ocr2MdError::FileNotFound {
                path: resolved.path.clone(),
            },
        })?;
    let input_bytes = bytes.len() as u64;
    debug!("Read {} bytes from {}", input_bytes, resolved.path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_recognition_start(&resolved.file_name, input_bytes);
    }

    let response = client
        .recognize(DocumentUpload {
            file_name: resolved.file_name.clone(),
            bytes,
        })
        .await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_recognition_complete(response.pages.len());
    }

    Ok((response, input_bytes))
}
