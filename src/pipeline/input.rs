//! Input loading: read a user-chosen file from disk into a [`SelectedFile`].
//!
//! The PDF filter is advisory. A file that lacks the `.pdf` extension or the
//! `%PDF` magic is still accepted (the conversion service decides what it
//! can parse); we only log a warning so the user learns why the service
//! might reject it.

use crate::error::ConvertError;
use crate::state::SelectedFile;
use std::path::Path;
use tracing::{debug, warn};

/// Load `path` as the selected file.
///
/// The advisory filter runs when the file is selected, not here.
pub async fn load_file(path: impl AsRef<Path>) -> Result<SelectedFile, ConvertError> {
    let path = path.as_ref();

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());

    let file = SelectedFile::new(name, bytes);
    debug!("Loaded {} ({} bytes)", path.display(), file.size);
    Ok(file)
}

/// Warn (never fail) when the file does not look like a PDF.
pub fn check_advisory_filter(file: &SelectedFile) -> bool {
    let looks_like_pdf = file.has_pdf_extension() && file.has_pdf_magic();
    if !file.has_pdf_extension() {
        warn!("'{}' has no .pdf extension; uploading anyway", file.name);
    } else if !file.has_pdf_magic() {
        let head: Vec<u8> = file.bytes.iter().take(4).copied().collect();
        warn!(
            "'{}' does not start with %PDF (first bytes: {:?}); uploading anyway",
            file.name, head
        );
    }
    looks_like_pdf
}
