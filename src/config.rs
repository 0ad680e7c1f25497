//! Configuration types for PDF-to-Markdown OCR conversion.
//!
//! All behaviour is controlled through [`OcrConfig`], built via its
//! [`OcrConfigBuilder`]. The library never reads environment variables:
//! the caller (the `ocr2md` binary, a test, a host application) decides
//! where settings come from and passes them in at call time.

use crate::error::Ocr2MdError;
use crate::pipeline::recognize::RecognitionClient;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default Mistral API root.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Default OCR model.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Configuration for a PDF-to-Markdown OCR conversion.
///
/// # Example
/// ```rust
/// use edgequake_ocr2md::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .api_key("sk-test")
///     .output_dir("out/report")
///     .request_timeout_secs(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// API key for the OCR service. Required unless `client` is set.
    pub api_key: Option<String>,

    /// Service API root. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// OCR model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Lifetime of the signed download URL handed to the OCR call, in hours. Default: 1.
    pub signed_url_expiry_hours: u32,

    /// Per-request HTTP timeout in seconds. Default: 300.
    ///
    /// The OCR call returns only after every page is recognised, so large
    /// documents need a generous limit.
    pub request_timeout_secs: u64,

    /// Bundle directory. If None, `ocr_results_<stem>` in the working directory.
    pub output_dir: Option<PathBuf>,

    /// Pre-constructed recognition client. Takes precedence over `api_key`.
    pub client: Option<Arc<dyn RecognitionClient>>,

    /// Optional progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            signed_url_expiry_hours: 1,
            request_timeout_secs: 300,
            output_dir: None,
            client: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("signed_url_expiry_hours", &self.signed_url_expiry_hours)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("output_dir", &self.output_dir)
            .field("client", &self.client.as_ref().map(|_| "<dyn RecognitionClient>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn signed_url_expiry_hours(mut self, hours: u32) -> Self {
        self.config.signed_url_expiry_hours = hours;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn RecognitionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing API key is not an error here: it is reported by
    /// [`crate::convert`] only when no `client` was injected either.
    pub fn build(self) -> Result<OcrConfig, Ocr2MdError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(Ocr2MdError::InvalidConfig("base URL must not be empty".into()));
        }
        if c.model.trim().is_empty() {
            return Err(Ocr2MdError::InvalidConfig("model must not be empty".into()));
        }
        if c.signed_url_expiry_hours == 0 {
            return Err(Ocr2MdError::InvalidConfig(
                "Signed URL expiry must be ≥ 1 hour".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(Ocr2MdError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if matches!(c.api_key.as_deref(), Some(k) if k.trim().is_empty()) {
            return Err(Ocr2MdError::InvalidConfig("API key must not be blank".into()));
        }
        Ok(self.config)
    }
}
