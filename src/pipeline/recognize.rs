//! Document recognition: local bytes → [`OcrResponse`] via the OCR service.
//!
//! The Mistral OCR flow takes three requests:
//!
//! ```text
//! POST /files (multipart, purpose=ocr)   → file id
//! GET  /files/{id}/url?expiry=<hours>    → signed URL
//! POST /ocr   {document_url, model, …}   → pages + base64 images
//! ```
//!
//! The client is the only stage with network I/O. It performs no retries:
//! every non-success status is mapped onto an [`Ocr2MdError`] service
//! variant and returned as-is.
//!
//! The service's JSON is decoded into private wire structs and converted to
//! the transport-independent [`OcrResponse`] before leaving this module.

use crate::config::OcrConfig;
use crate::error::Ocr2MdError;
use crate::response::{OcrImage, OcrPage, OcrResponse, UsageInfo};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A document to recognise.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Anything that can turn document bytes into an [`OcrResponse`].
///
/// Implemented by [`MistralOcrClient`]; tests and host applications can
/// inject their own through [`crate::config::OcrConfigBuilder::client`].
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    async fn recognize(&self, document: DocumentUpload) -> Result<OcrResponse, Ocr2MdError>;
}

/// HTTP client for the Mistral OCR API.
pub struct MistralOcrClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    expiry_hours: u32,
    timeout_secs: u64,
}

impl MistralOcrClient {
    /// Build a client from `config`, which must carry an API key.
    pub fn from_config(config: &OcrConfig) -> Result<Self, Ocr2MdError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Ocr2MdError::ConfigMissing {
                key: "MISTRAL_API_KEY".into(),
                hint: "API key is not set. Export MISTRAL_API_KEY or pass --api-key.".into(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Ocr2MdError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            expiry_hours: config.signed_url_expiry_hours,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Upload the document and return the service's file id.
    pub async fn upload_file(&self, document: DocumentUpload) -> Result<String, Ocr2MdError> {
        const STAGE: &str = "upload";
        let size = document.bytes.len();
        let part = Part::bytes(document.bytes).file_name(document.file_name.clone());
        let form = Form::new().text("purpose", "ocr").part("file", part);

        let response = self
            .http
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(STAGE, e))?;

        let uploaded: UploadedFile = parse_json(STAGE, check_status(STAGE, response).await?).await?;
        info!("Uploaded {} ({} bytes) as file {}", document.file_name, size, uploaded.id);
        Ok(uploaded.id)
    }

    /// Ask for a time-limited download URL for an uploaded file.
    pub async fn signed_url(&self, file_id: &str) -> Result<String, Ocr2MdError> {
        const STAGE: &str = "signed URL";
        let response = self
            .http
            .get(format!("{}/files/{}/url", self.base_url, file_id))
            .query(&[("expiry", self.expiry_hours)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(STAGE, e))?;

        let signed: SignedUrl = parse_json(STAGE, check_status(STAGE, response).await?).await?;
        debug!("Signed URL for {} valid {}h", file_id, self.expiry_hours);
        Ok(signed.url)
    }

    /// Run OCR over the document at `document_url`, images included.
    pub async fn process(&self, document_url: &str) -> Result<OcrResponse, Ocr2MdError> {
        const STAGE: &str = "ocr";
        let body = OcrRequest {
            model: &self.model,
            document: DocumentUrlChunk {
                kind: "document_url",
                document_url,
            },
            include_image_base64: true,
        };

        let response = self
            .http
            .post(format!("{}/ocr", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(STAGE, e))?;

        let wire: WireOcrResponse = parse_json(STAGE, check_status(STAGE, response).await?).await?;
        wire.into_response()
    }

    fn transport_error(&self, stage: &str, e: reqwest::Error) -> Ocr2MdError {
        if e.is_timeout() {
            Ocr2MdError::ServiceTimeout {
                stage: stage.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            Ocr2MdError::ServiceUnavailable {
                stage: stage.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl RecognitionClient for MistralOcrClient {
    async fn recognize(&self, document: DocumentUpload) -> Result<OcrResponse, Ocr2MdError> {
        let start = Instant::now();
        let file_id = self.upload_file(document).await?;
        let url = self.signed_url(&file_id).await?;
        let response = self.process(&url).await?;
        info!(
            "OCR returned {} pages, {} images in {}ms",
            response.pages.len(),
            response.image_count(),
            start.elapsed().as_millis()
        );
        Ok(response)
    }
}

// ── HTTP helpers ─────────────────────────────────────────────────────────

/// Pass 2xx responses through; map everything else to a service error.
async fn check_status(stage: &str, response: Response) -> Result<Response, Ocr2MdError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    Err(status_error(stage, status, retry_after_secs, &body))
}

fn status_error(
    stage: &str,
    status: StatusCode,
    retry_after_secs: Option<u64>,
    body: &str,
) -> Ocr2MdError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ocr2MdError::AuthError {
            stage: stage.to_string(),
            detail: message,
        },
        StatusCode::TOO_MANY_REQUESTS => Ocr2MdError::RateLimitExceeded {
            stage: stage.to_string(),
            retry_after_secs,
        },
        _ => Ocr2MdError::ApiError {
            stage: stage.to_string(),
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull a human-readable message out of an error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let found = value
            .get("message")
            .or_else(|| value.get("detail"))
            .or_else(|| value.get("error").and_then(|e| e.get("message")));
        if let Some(found) = found {
            return Some(match found.as_str() {
                Some(s) => s.to_string(),
                None => found.to_string(),
            });
        }
    }
    Some(trimmed.chars().take(300).collect())
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    stage: &str,
    response: Response,
) -> Result<T, Ocr2MdError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Ocr2MdError::ServiceUnavailable {
            stage: stage.to_string(),
            reason: e.to_string(),
        })?;
    serde_json::from_slice(&bytes).map_err(|e| Ocr2MdError::InvalidResponse {
        stage: stage.to_string(),
        detail: e.to_string(),
    })
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

#[derive(Debug, serde::Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: DocumentUrlChunk<'a>,
    include_image_base64: bool,
}

#[derive(Debug, serde::Serialize)]
struct DocumentUrlChunk<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    document_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireOcrResponse {
    pages: Vec<WirePage>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage_info: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WirePage {
    index: usize,
    markdown: String,
    #[serde(default)]
    images: Vec<WireImage>,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    id: String,
    #[serde(default)]
    image_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    pages_processed: u32,
    #[serde(default)]
    doc_size_bytes: Option<u64>,
}

impl WireOcrResponse {
    fn into_response(self) -> Result<OcrResponse, Ocr2MdError> {
        let pages = self
            .pages
            .into_iter()
            .map(|page| {
                let images = page
                    .images
                    .into_iter()
                    .map(|img| match img.image_base64 {
                        Some(encoded_data) => Ok(OcrImage {
                            id: img.id,
                            encoded_data,
                        }),
                        None => Err(Ocr2MdError::InvalidResponse {
                            stage: "ocr".into(),
                            detail: format!(
                                "page {}: image '{}' has no image_base64 payload",
                                page.index, img.id
                            ),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(OcrPage {
                    index: page.index,
                    markdown: page.markdown,
                    images,
                })
            })
            .collect::<Result<Vec<_>, Ocr2MdError>>()?;

        Ok(OcrResponse {
            pages,
            model: self.model,
            usage: self.usage_info.map(|u| UsageInfo {
                pages_processed: u.pages_processed,
                doc_size_bytes: u.doc_size_bytes,
            }),
        })
    }
}
