//! CLI binary for pdf-converter.
//!
//! A thin shim over the library crate: maps CLI flags to `ClientConfig`
//! and the two selections, shows a spinner while the service works, and
//! writes the downloads.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_converter::{
    Backend, ClientConfig, Controller, ControllerObserver, ConversionResult, Observer, OutputMode,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal observer using indicatif ────────────────────────────────────────

/// Renders the busy indicator as a spinner and alerts as red lines on
/// stderr.
struct CliObserver {
    bar: ProgressBar,
    show_spinner: bool,
    quiet: bool,
}

impl CliObserver {
    fn new(label: String, show_spinner: bool, quiet: bool) -> Arc<Self> {
        let bar = ProgressBar::hidden();
        if show_spinner {
            let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.set_prefix("Converting");
            bar.set_message(label);
        }
        Arc::new(Self {
            bar,
            show_spinner,
            quiet,
        })
    }
}

impl ControllerObserver for CliObserver {
    fn on_busy_changed(&self, busy: bool) {
        if !self.show_spinner {
            return;
        }
        if busy {
            self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            self.bar.enable_steady_tick(Duration::from_millis(80));
        } else {
            self.bar.finish_and_clear();
        }
    }

    fn on_alert(&self, message: &str) {
        self.bar.suspend(|| eprintln!("{} {}", red("✘"), red(message)));
    }

    fn on_result(&self, result: &ConversionResult) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} {} chars of Markdown, {} images, metadata: {}",
            green("✔"),
            bold(&result.markdown_text().len().to_string()),
            bold(&result.images.len().to_string()),
            if result.metadata.is_some() { "yes" } else { "no" },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to stdout via the basic service
  pdfconv document.pdf

  # Layout-aware conversion, save converted.md, metadata.json and page images
  pdfconv --backend layout -o out/ --save-images paper.pdf

  # JSON metadata only
  pdfconv --output json document.pdf > metadata.json

  # Self-hosted service
  pdfconv --basic-url http://localhost:8000/convert document.pdf

  # Is the layout service up?
  pdfconv --health --backend layout

BACKENDS:
  basic    marker-based text and image extraction (default)
  layout   surya layout detection + OCR; page images carry layout boxes and
           metadata.json is replaced by the per-page layout document

OUTPUT FILES (with --out-dir):
  converted.md     Markdown text, byte for byte as returned
  metadata.json    metadata, pretty-printed with two-space indent
  page_N.png       page images (only with --save-images)

ENVIRONMENT VARIABLES:
  PDFCONV_BASIC_URL    Endpoint of the basic service
  PDFCONV_LAYOUT_URL   Endpoint of the layout service
  PDFCONV_OUTPUT       Default output format
  PDFCONV_BACKEND      Default backend
  RUST_LOG             Log filter (overrides --verbose)
"#;

/// Convert PDF files with a remote conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "pdfconv",
    version,
    about = "Convert PDF files to Markdown, images and metadata via a remote service",
    long_about = "Upload a PDF to one of two conversion services (basic or layout-aware) and \
unpack the result: Markdown text, page images and a JSON metadata document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    #[arg(required_unless_present = "health")]
    input: Option<PathBuf>,

    /// Output format requested from the service.
    #[arg(long, env = "PDFCONV_OUTPUT", value_enum, default_value = "markdown")]
    output: FormatArg,

    /// Conversion backend.
    #[arg(short, long, env = "PDFCONV_BACKEND", value_enum, default_value = "basic")]
    backend: BackendArg,

    /// Save converted.md / metadata.json into this directory.
    #[arg(short, long, env = "PDFCONV_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Also save page images into --out-dir.
    #[arg(long, requires = "out_dir")]
    save_images: bool,

    /// Print the result to stdout even when --out-dir is given.
    #[arg(long)]
    print: bool,

    /// Print the controller view state as JSON after converting.
    #[arg(long)]
    state: bool,

    /// Endpoint of the basic service.
    #[arg(long, env = "PDFCONV_BASIC_URL")]
    basic_url: Option<String>,

    /// Endpoint of the layout service.
    #[arg(long, env = "PDFCONV_LAYOUT_URL")]
    layout_url: Option<String>,

    /// Request timeout in seconds (default: wait indefinitely).
    #[arg(long, env = "PDFCONV_TIMEOUT")]
    timeout: Option<u64>,

    /// Largest upload in MiB.
    #[arg(long, env = "PDFCONV_MAX_UPLOAD_MB", default_value_t = 20)]
    max_upload_mb: u64,

    /// Check the selected backend's health endpoint and exit.
    #[arg(long)]
    health: bool,

    /// Disable the spinner.
    #[arg(long, env = "PDFCONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFCONV_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for OutputMode {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Markdown => OutputMode::Markdown,
            FormatArg::Json => OutputMode::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Basic,
    Layout,
}

impl From<BackendArg> for Backend {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Basic => Backend::Basic,
            BackendArg::Layout => Backend::Layout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; keep INFO logs from
    // tearing through it unless asked for.
    let show_spinner = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
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

    let config = build_config(&cli)?;
    let backend: Backend = cli.backend.into();
    let mode: OutputMode = cli.output.into();

    // ── Health-check mode ────────────────────────────────────────────────
    if cli.health {
        let mut controller = Controller::new(config).context("Failed to create client")?;
        controller.set_backend(backend);
        let url = controller.config().health_url(backend);
        let healthy = controller.health().await.context("Health check failed")?;
        if healthy {
            println!("{} {backend} service is healthy ({url})", green("✔"));
            return Ok(());
        }
        println!("{} {backend} service is unhealthy ({url})", red("✘"));
        std::process::exit(1);
    }

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("No input file given");
    };

    let label = format!(
        "{} via {backend} ({mode})",
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    let observer: Observer = CliObserver::new(label, show_spinner, cli.quiet);

    let mut controller = Controller::new(config)
        .context("Failed to create client")?
        .with_observer(observer);
    controller
        .select_path(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    controller.set_output_mode(mode);
    controller.set_backend(backend);

    // ── Run conversion ───────────────────────────────────────────────────
    if controller.convert().await.is_err() {
        // The observer has already shown the alert.
        std::process::exit(1);
    }

    if let Some(ref dir) = cli.out_dir {
        save_downloads(&controller, dir, cli.save_images, cli.quiet).await?;
    }

    if cli.out_dir.is_none() || cli.print {
        print_result(controller.result())?;
    }

    if cli.state {
        let json = serde_json::to_string_pretty(controller.state())
            .context("Failed to serialise view state")?;
        println!("{json}");
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let max_upload_bytes = cli
        .max_upload_mb
        .checked_mul(1024 * 1024)
        .with_context(|| format!("--max-upload-mb {} is too large", cli.max_upload_mb))?;
    let mut builder = ClientConfig::builder().max_upload_bytes(max_upload_bytes);
    if let Some(ref url) = cli.basic_url {
        builder = builder.basic_url(url);
    }
    if let Some(ref url) = cli.layout_url {
        builder = builder.layout_url(url);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

/// Write every download the result supports into `dir`.
async fn save_downloads(
    controller: &Controller,
    dir: &Path,
    save_images: bool,
    quiet: bool,
) -> Result<()> {
    let result = controller.result();
    let mut saved: Vec<PathBuf> = Vec::new();

    if result.has_markdown() {
        saved.push(controller.download_markdown()?.save_to(dir).await?);
    }
    if result.metadata.is_some() {
        saved.push(controller.download_metadata()?.save_to(dir).await?);
    }
    if save_images {
        for image in &result.images {
            saved.push(image.save_to(dir).await?);
        }
    }

    if !quiet {
        for path in &saved {
            eprintln!("   {} {}", dim("→"), path.display());
        }
    }
    Ok(())
}

/// Markdown (or pretty metadata in json mode) to stdout.
fn print_result(result: &ConversionResult) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let text = if result.has_markdown() {
        result.markdown_text().to_string()
    } else if let Some(ref meta) = result.metadata {
        serde_json::to_string_pretty(meta).context("Failed to serialise metadata")?
    } else {
        return Ok(());
    };

    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
