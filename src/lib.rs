//! # pdf-converter
//!
//! Upload a PDF to a remote conversion service and unpack what comes back:
//! Markdown text, page images and a JSON metadata document.
//!
//! The heavy lifting (PDF parsing, layout analysis, OCR, Markdown
//! generation) happens in two hosted services. This crate is the client
//! side: it holds the user's selections in an explicit [`ViewState`],
//! performs the multipart upload, decodes the JSON or ZIP response, and
//! produces the `converted.md` / `metadata.json` downloads.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    read the chosen file (PDF filter is advisory)
//!  ├─ 2. Upload   POST multipart `file` to basic or layout service
//!  ├─ 3. Archive  JSON body → metadata, or ZIP body → entries by suffix
//!  ├─ 4. Encode   PNG entries → displayable image payloads
//!  └─ 5. Output   ConversionResult + client-side downloads
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_converter::{Backend, ClientConfig, Controller, OutputMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut controller = Controller::new(ClientConfig::default())?;
//!     controller.select_path("document.pdf").await?;
//!     controller.set_output_mode(OutputMode::Markdown);
//!     controller.set_backend(Backend::Layout);
//!
//!     let result = controller.convert().await?;
//!     println!("{}", result.markdown_text());
//!     eprintln!("{} page images", result.images.len());
//!
//!     controller.download_markdown()?.save_to("out").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfconv` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod observer;
pub mod output;
pub mod pipeline;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Backend, ClientConfig, ClientConfigBuilder, OutputMode};
pub use controller::Controller;
pub use download::Download;
pub use error::ConvertError;
pub use observer::{ControllerObserver, NoopObserver, Observer};
pub use output::{ConversionResult, ImagePayload};
pub use state::{Phase, SelectedFile, ViewState};
