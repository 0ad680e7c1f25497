//! End-to-end tests for edgequake-ocr2md.
//!
//! The orchestration tests inject a scripted `RecognitionClient`, so they run
//! offline. The live test at the bottom calls the real Mistral OCR API and is
//! gated behind `E2E_ENABLED` and `MISTRAL_API_KEY`.
//!
//! Run the live test with:
//!   E2E_ENABLED=1 MISTRAL_API_KEY=... cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use edgequake_ocr2md::{
    convert, convert_to_dir, recognize, ConversionProgressCallback, DocumentUpload, Ocr2MdError,
    OcrConfig, OcrPage, OcrResponse, RecognitionClient,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Returns a canned response and remembers what it was asked to recognise.
struct ScriptedClient {
    response: Result<OcrResponse, fn() -> Ocr2MdError>,
    seen: Mutex<Vec<(String, usize)>>,
}

impl ScriptedClient {
    fn ok(response: OcrResponse) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(make_err: fn() -> Ocr2MdError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(make_err),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecognitionClient for ScriptedClient {
    async fn recognize(&self, document: DocumentUpload) -> Result<OcrResponse, Ocr2MdError> {
        self.seen
            .lock()
            .unwrap()
            .push((document.file_name.clone(), document.bytes.len()));
        match &self.response {
            Ok(r) => Ok(r.clone()),
            Err(make_err) => Err(make_err()),
        }
    }
}

#[derive(Default)]
struct CountingCallback {
    recognition_started: AtomicUsize,
    pages_assembled: AtomicUsize,
    images_reported: AtomicUsize,
}

impl ConversionProgressCallback for CountingCallback {
    fn on_recognition_start(&self, _file_name: &str, _bytes: u64) {
        self.recognition_started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_page_assembled(&self, _page_num: usize, _total_pages: usize, image_count: usize) {
        self.pages_assembled.fetch_add(1, Ordering::SeqCst);
        self.images_reported.fetch_add(image_count, Ordering::SeqCst);
    }
}

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.7\n%fake\n").unwrap();
    path
}

fn two_page_response() -> OcrResponse {
    OcrResponse::from_pages(vec![
        OcrPage::new(0, "# Title\n![img-0](img-0)")
            .with_image("img-0", "data:image/png;base64,iVBORw0KGgo="),
        OcrPage::new(1, "No images here."),
    ])
}

// ── Orchestration with a scripted client ─────────────────────────────────────

#[tokio::test]
async fn convert_writes_bundle_to_configured_dir() {
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "report.pdf");
    let out = tmp.path().join("ocr_results_report");
    let client = ScriptedClient::ok(two_page_response());

    let config = OcrConfig::builder()
        .client(client.clone())
        .output_dir(&out)
        .build()
        .unwrap();

    let output = convert(&pdf, &config).await.expect("conversion succeeds");

    assert_eq!(client.calls(), vec![("report.pdf".to_string(), 15)]);
    assert_eq!(output.bundle.root, out);
    assert_eq!(output.stats.total_pages, 2);
    assert_eq!(output.stats.total_images, 1);
    assert_eq!(output.stats.image_bytes, 8);
    assert_eq!(output.stats.input_bytes, 15);

    let md = std::fs::read_to_string(out.join("complete.md")).unwrap();
    assert_eq!(md, "# Title\n![img-0](images/img-0.png)\n\nNo images here.");
    assert_eq!(
        std::fs::read(out.join("images/img-0.png")).unwrap(),
        b"\x89PNG\r\n\x1a\n"
    );
}

#[tokio::test]
async fn convert_to_dir_ignores_configured_output_dir() {
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "a.pdf");
    let explicit = tmp.path().join("explicit");

    let config = OcrConfig::builder()
        .client(ScriptedClient::ok(two_page_response()))
        .output_dir(tmp.path().join("configured"))
        .build()
        .unwrap();

    convert_to_dir(&pdf, &explicit, &config).await.unwrap();

    assert!(explicit.join("complete.md").is_file());
    assert!(!tmp.path().join("configured").exists());
}

#[tokio::test]
async fn progress_callback_sees_every_page() {
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "doc.pdf");
    let cb = Arc::new(CountingCallback::default());

    let config = OcrConfig::builder()
        .client(ScriptedClient::ok(two_page_response()))
        .output_dir(tmp.path().join("out"))
        .progress_callback(cb.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    convert(&pdf, &config).await.unwrap();

    assert_eq!(cb.recognition_started.load(Ordering::SeqCst), 1);
    assert_eq!(cb.pages_assembled.load(Ordering::SeqCst), 2);
    assert_eq!(cb.images_reported.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_api_key_fails_before_reading_input() {
    let config = OcrConfig::builder().build().unwrap();

    // The input does not exist either; the config error must win.
    let err = convert("/definitely/not/a/real/file.pdf", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Ocr2MdError::ConfigMissing { .. }), "got: {err:?}");
}

#[tokio::test]
async fn missing_input_fails_before_calling_service() {
    let tmp = TempDir::new().unwrap();
    let client = ScriptedClient::ok(two_page_response());
    let config = OcrConfig::builder()
        .client(client.clone())
        .output_dir(tmp.path().join("out"))
        .build()
        .unwrap();

    let err = convert(tmp.path().join("absent.pdf"), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Ocr2MdError::FileNotFound { .. }));
    assert!(client.calls().is_empty());
    assert!(!tmp.path().join("out").exists());
}

#[tokio::test]
async fn directory_input_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = OcrConfig::builder()
        .client(ScriptedClient::ok(OcrResponse::default()))
        .build()
        .unwrap();

    let err = convert(tmp.path(), &config).await.unwrap_err();
    assert!(matches!(err, Ocr2MdError::NotAFile { .. }));
}

#[tokio::test]
async fn service_error_is_returned_not_swallowed() {
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "doc.pdf");
    let out = tmp.path().join("out");
    let config = OcrConfig::builder()
        .client(ScriptedClient::failing(|| Ocr2MdError::ApiError {
            stage: "ocr".into(),
            status: 500,
            message: "internal".into(),
        }))
        .output_dir(&out)
        .build()
        .unwrap();

    let err = convert(&pdf, &config).await.unwrap_err();

    assert!(err.is_service_error());
    assert!(!out.exists(), "no bundle is created when recognition fails");
}

#[tokio::test]
async fn decode_error_propagates_from_convert() {
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "doc.pdf");
    let response = OcrResponse::from_pages(vec![
        OcrPage::new(0, "![x](x)").with_image("x", "missing-separator"),
    ]);
    let config = OcrConfig::builder()
        .client(ScriptedClient::ok(response))
        .output_dir(tmp.path().join("out"))
        .build()
        .unwrap();

    let err = convert(&pdf, &config).await.unwrap_err();
    assert!(matches!(err, Ocr2MdError::ImageDecode { page: 1, .. }));
}

#[tokio::test]
async fn recognize_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "doc.pdf");
    let out = tmp.path().join("out");
    let config = OcrConfig::builder()
        .client(ScriptedClient::ok(two_page_response()))
        .output_dir(&out)
        .build()
        .unwrap();

    let response = recognize(&pdf, &config).await.unwrap();

    assert_eq!(response, two_page_response());
    assert!(!out.exists());
}

// ── Live service (needs API key) ─────────────────────────────────────────────

/// Skip unless E2E_ENABLED and MISTRAL_API_KEY are set *and* the file exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let key = match std::env::var("MISTRAL_API_KEY") {
            Ok(k) if !k.is_empty() => k,
            _ => {
                println!("SKIP — MISTRAL_API_KEY is not set");
                return;
            }
        };
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        (p, key)
    }};
}

#[tokio::test]
async fn test_live_convert() {
    let (path, key) = e2e_skip_unless_ready!(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/sample.pdf")
    );
    let tmp = TempDir::new().unwrap();

    let config = OcrConfig::builder()
        .api_key(key)
        .output_dir(tmp.path().join("ocr_results_sample"))
        .build()
        .expect("valid config");

    let output = convert(&path, &config).await.expect("live conversion");

    assert!(output.stats.total_pages > 0);
    let md = std::fs::read_to_string(&output.bundle.markdown_path).unwrap();
    assert!(!md.trim().is_empty(), "complete.md is empty");
    for page in &output.bundle.pages {
        for id in &page.image_ids {
            assert!(output.bundle.images_dir.join(format!("{id}.png")).is_file());
        }
    }
    println!(
        "✓ {} pages, {} images, {}ms",
        output.stats.total_pages, output.stats.total_images, output.stats.total_duration_ms
    );
}
