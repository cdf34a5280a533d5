//! Client-side downloads of a conversion result.
//!
//! A [`Download`] is an in-memory file artifact (name, MIME type, bytes)
//! built from the current result without touching the network. Front ends
//! decide what to do with it; [`Download::save_to`] writes it into a
//! directory atomically (temp file + rename) so a crash never leaves a
//! half-written `converted.md` behind.

use crate::error::ConvertError;
use crate::output::{ConversionResult, ImagePayload};
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// File name of the Markdown download.
pub const MARKDOWN_FILE_NAME: &str = "converted.md";

/// File name of the metadata download.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// A locally generated file, ready to be saved or offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: Vec<u8>,
}

impl Download {
    /// Contents as text (downloads are always UTF-8).
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.contents).unwrap_or_default()
    }

    /// Write the download into `dir`, returning the final path.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
        let path = dir.as_ref().join(&self.file_name);
        write_atomic(&path, &self.contents).await?;
        info!("Saved {} ({} bytes)", path.display(), self.contents.len());
        Ok(path)
    }
}

/// `converted.md` with the Markdown text, byte for byte.
pub fn markdown(result: &ConversionResult) -> Result<Download, ConvertError> {
    if !result.has_markdown() {
        return Err(ConvertError::NothingToDownload { what: "markdown" });
    }
    Ok(Download {
        file_name: MARKDOWN_FILE_NAME.to_string(),
        mime_type: "text/markdown",
        contents: result.markdown_text().as_bytes().to_vec(),
    })
}

/// `metadata.json` with the metadata pretty-printed at two-space indent.
pub fn metadata(result: &ConversionResult) -> Result<Download, ConvertError> {
    let value = result
        .metadata
        .as_ref()
        .ok_or(ConvertError::NothingToDownload { what: "metadata" })?;
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ConvertError::Internal(format!("Failed to serialise metadata: {e}")))?;
    Ok(Download {
        file_name: METADATA_FILE_NAME.to_string(),
        mime_type: "application/json",
        contents: text.into_bytes(),
    })
}

impl ImagePayload {
    /// Write the PNG into `dir` under its archive file name.
    ///
    /// Directory components of the entry name are dropped, so
    /// `../../x.png` lands at `dir/x.png`.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
        let file_name = Path::new(&self.name)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .next_back()
            .map(PathBuf::from)
            .ok_or_else(|| ConvertError::InvalidEntry {
                name: self.name.clone(),
                detail: "entry has no file name".into(),
            })?;
        let path = dir.as_ref().join(file_name);
        write_atomic(&path, &self.bytes).await?;
        Ok(path)
    }
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConvertError> {
    let write_failed = |source| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(write_failed)?;
    Ok(())
}
