//! Error types for the pdf-converter library.
//!
//! A conversion touches three very different things: the local file system
//! (picking the PDF, saving downloads), a remote HTTP service, and the
//! payload that service sends back. [`ConvertError`] groups its variants by
//! those sources so the CLI can print an actionable message for each:
//!
//! * **Request** failures: the service answered with a non-2xx status, or
//!   the connection itself failed.
//! * **Parse** failures: the body was not valid JSON, or not a readable
//!   ZIP archive.
//! * **Precondition** failures: the operation was invoked in a state where
//!   it cannot run (no file selected, a conversion already in flight,
//!   nothing to download, upload larger than the service accepts).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-converter library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The conversion service answered with a non-success status.
    #[error("Upload failed: {status}{}", fmt_detail(.detail))]
    Request { status: u16, detail: Option<String> },

    /// The request never produced a response (DNS, TLS, refused, timeout).
    #[error("Could not reach conversion service at '{url}': {reason}")]
    Transport { url: String, reason: String },

    // ── Parse errors ──────────────────────────────────────────────────────
    /// The body of a json-mode response is not valid JSON.
    #[error("Invalid JSON in response: {0}")]
    InvalidJson(String),

    /// The body of a markdown-mode response is not a readable ZIP archive.
    #[error("Invalid archive in response: {0}")]
    InvalidArchive(String),

    /// A single archive entry could not be decoded.
    #[error("Invalid archive entry '{name}': {detail}")]
    InvalidEntry { name: String, detail: String },

    // ── Precondition errors ───────────────────────────────────────────────
    /// `convert` was called before any file was selected.
    #[error("No file selected.\nChoose a PDF before converting.")]
    NoFileSelected,

    /// `convert` was called while another conversion is outstanding.
    #[error("A conversion is already in progress")]
    AlreadyConverting,

    /// A download was requested for an empty result.
    #[error("Nothing to download: the {what} result is empty")]
    NothingToDownload { what: &'static str },

    /// The selected file exceeds the upload cap of the services.
    #[error("File '{name}' is {size} bytes; the conversion service accepts at most {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Could not create or write a downloaded artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" ({d})"),
        _ => String::new(),
    }
}

impl ConvertError {
    /// True for errors caused by the remote service or the transport.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Transport { .. })
    }

    /// True for errors caused by a malformed response payload.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidJson(_) | Self::InvalidArchive(_) | Self::InvalidEntry { .. }
        )
    }

    /// True for errors raised before any network traffic happened.
    pub fn is_precondition_error(&self) -> bool {
        matches!(
            self,
            Self::NoFileSelected
                | Self::AlreadyConverting
                | Self::NothingToDownload { .. }
                | Self::FileTooLarge { .. }
        )
    }
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(e: zip::result::ZipError) -> Self {
        ConvertError::InvalidArchive(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_display_contains_status() {
        let e = ConvertError::Request {
            status: 500,
            detail: None,
        };
        assert_eq!(e.to_string(), "Upload failed: 500");
        assert!(e.is_request_error());
    }

    #[test]
    fn request_display_with_detail() {
        let e = ConvertError::Request {
            status: 413,
            detail: Some("File too large (max 20MB)".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("413"), "got: {msg}");
        assert!(msg.contains("File too large"), "got: {msg}");
    }

    #[test]
    fn parse_errors_are_classified() {
        assert!(ConvertError::InvalidJson("eof".into()).is_parse_error());
        assert!(ConvertError::InvalidArchive("bad".into()).is_parse_error());
        assert!(!ConvertError::NoFileSelected.is_parse_error());
    }

    #[test]
    fn precondition_errors_are_classified() {
        assert!(ConvertError::NoFileSelected.is_precondition_error());
        assert!(ConvertError::AlreadyConverting.is_precondition_error());
        assert!(ConvertError::NothingToDownload { what: "markdown" }.is_precondition_error());
        assert!(!ConvertError::Request {
            status: 404,
            detail: None
        }
        .is_precondition_error());
    }

    #[test]
    fn file_too_large_display() {
        let e = ConvertError::FileTooLarge {
            name: "big.pdf".into(),
            size: 30,
            limit: 20,
        };
        assert!(e.to_string().contains("big.pdf"));
        assert!(e.to_string().contains("at most 20 bytes"));
    }
}
