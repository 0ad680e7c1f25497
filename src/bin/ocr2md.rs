//! CLI binary for edgequake-ocr2md.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `OcrConfig`, runs the conversion and reports the result.
//! Any failure exits with a non-zero status.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_ocr2md::{
    convert, ConversionProgressCallback, OcrConfig, ProgressCallback, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the service works, then a page bar while the bundle is written.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Arc<Self> {
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Remove the bar so an error report is not drawn next to a stale spinner.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_recognition_start(&self, file_name: &str, bytes: u64) {
        self.bar.set_prefix("Recognising");
        self.bar
            .set_message(format!("{file_name} {}", dim(&format!("({bytes} bytes)"))));
    }

    fn on_recognition_complete(&self, total_pages: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("OCR returned {total_pages} pages"))
        ));
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_pages as u64);
        self.bar.set_prefix("Writing");
    }

    fn on_page_assembled(&self, page_num: usize, total_pages: usize, image_count: usize) {
        if image_count > 0 {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total_pages,
                dim(&format!("{image_count} images")),
            ));
        }
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_pages: usize, _total_images: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion → ./ocr_results_document/
  ocr2md document.pdf

  # Choose the bundle directory
  ocr2md document.pdf -o out/document

  # Also print the assembled Markdown
  ocr2md --print document.pdf

  # Machine-readable summary
  ocr2md --json document.pdf > summary.json

OUTPUT LAYOUT:
  ocr_results_<stem>/
  ├── complete.md        pages joined by a blank line
  └── images/<id>.png    one file per extracted image

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY      API key (required)
  PDF_PATH             Input document when no positional argument is given
  MISTRAL_OCR_MODEL    Override the OCR model
  MISTRAL_BASE_URL     Override the API root
  OCR2MD_OUTPUT_DIR    Override the bundle directory
"#;

/// Convert PDF files to Markdown plus images using Mistral OCR.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "Convert PDF files to Markdown plus images using Mistral OCR",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(env = "PDF_PATH")]
    input: PathBuf,

    /// Mistral API key.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OCR model ID.
    #[arg(long, env = "MISTRAL_OCR_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API root URL.
    #[arg(long, env = "MISTRAL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Bundle directory (default: ocr_results_<input stem>).
    #[arg(short, long, env = "OCR2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Signed URL lifetime in hours.
    #[arg(long, env = "OCR2MD_EXPIRY_HOURS", default_value_t = 1)]
    expiry_hours: u32,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "OCR2MD_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Write complete.md to stdout as well.
    #[arg(long)]
    print: bool,

    /// Print the conversion summary as JSON.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCR2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCR2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the progress bar.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.print;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let cli_progress = show_progress.then(CliProgressCallback::new);
    let progress_cb = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn ConversionProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = convert(&cli.input, &config).await;
    if result.is_err() {
        if let Some(ref cb) = cli_progress {
            cb.abandon();
        }
    }
    let output = result.context("OCR conversion failed")?;

    if cli.print {
        let markdown = tokio::fs::read_to_string(&output.bundle.markdown_path)
            .await
            .with_context(|| format!("Failed to read {:?}", output.bundle.markdown_path))?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{} OCR processing is complete. Results saved to: {}",
            green("✔"),
            bold(&output.bundle.root.display().to_string())
        );
        eprintln!(
            "   {} pages  /  {} images  ·  {}ms total",
            dim(&output.stats.total_pages.to_string()),
            dim(&output.stats.total_images.to_string()),
            output.stats.total_duration_ms,
        );
        for (page, id) in output.bundle.unresolved_placeholders() {
            eprintln!("   {} page {page}: no image for placeholder '{id}'", cyan("⚠"));
        }
    }

    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<OcrConfig> {
    let mut builder = OcrConfig::builder()
        .model(&cli.model)
        .base_url(&cli.base_url)
        .signed_url_expiry_hours(cli.expiry_hours)
        .request_timeout_secs(cli.timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
