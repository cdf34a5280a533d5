//! Output types returned by a conversion.

use crate::config::OutputMode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// The parsed response of one successful conversion.
///
/// In json mode only [`metadata`](Self::metadata) is populated. In markdown
/// mode all three fields may be populated, depending on what the archive
/// contained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The mode the result was requested with.
    pub mode: OutputMode,

    /// Markdown text from the archive's `.md` entry, if any.
    pub markdown: Option<String>,

    /// Page images from the archive's `.png` entries, in archive order.
    pub images: Vec<ImagePayload>,

    /// The JSON metadata document, if any.
    pub metadata: Option<serde_json::Value>,
}

impl ConversionResult {
    /// A json-mode result: the whole body is the metadata document.
    pub fn from_json(metadata: serde_json::Value) -> Self {
        Self {
            mode: OutputMode::Json,
            markdown: None,
            images: Vec::new(),
            metadata: Some(metadata),
        }
    }

    /// True when there is Markdown text worth showing or downloading.
    pub fn has_markdown(&self) -> bool {
        self.markdown.as_deref().is_some_and(|md| !md.is_empty())
    }

    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        !self.has_markdown() && self.images.is_empty() && self.metadata.is_none()
    }

    /// Markdown text, or `""` when none was returned.
    pub fn markdown_text(&self) -> &str {
        self.markdown.as_deref().unwrap_or("")
    }
}

/// A PNG image extracted from the archive, ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Entry name inside the archive, e.g. `page_1.png`.
    pub name: String,

    /// Always `image/png`.
    pub mime_type: String,

    /// Pixel width, when the PNG header could be read.
    pub width: Option<u32>,

    /// Pixel height, when the PNG header could be read.
    pub height: Option<u32>,

    /// Raw PNG bytes. Not serialised; use [`Self::data_uri`] for display.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// `data:image/png;base64,…` URI suitable for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Size of the PNG in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
