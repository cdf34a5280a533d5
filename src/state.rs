//! View state owned by a [`crate::Controller`].
//!
//! Everything an interface needs to render lives in one serialisable
//! [`ViewState`]: the chosen file, both mode selections, where the
//! controller is in its lifecycle, and the last result. The controller is
//! the only writer.

use crate::config::{Backend, OutputMode};
use crate::output::ConversionResult;
use serde::{Deserialize, Serialize};

/// The PDF the user picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// File name sent in the multipart `file` field.
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// File contents. Not serialised.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Advisory check: does the name carry a `.pdf` extension?
    pub fn has_pdf_extension(&self) -> bool {
        self.name.to_lowercase().ends_with(".pdf")
    }

    /// Advisory check: do the bytes start with the `%PDF` magic?
    pub fn has_pdf_magic(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }
}

/// Lifecycle of the controller.
///
/// ```text
/// Idle ──convert()──▶ Converting ──▶ Succeeded
///                          │
///                          └───────▶ Failed
/// ```
/// `Succeeded` and `Failed` behave like `Idle`: another `convert()` may
/// start from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Converting,
    Succeeded,
    Failed,
}

impl Phase {
    /// The busy indicator is shown only while converting.
    pub fn is_busy(self) -> bool {
        self == Phase::Converting
    }
}

/// Serialisable snapshot of everything the interface shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub file: Option<SelectedFile>,
    pub output_mode: OutputMode,
    pub backend: Backend,
    pub phase: Phase,
    pub result: ConversionResult,
}

impl ViewState {
    /// The convert action is enabled only with a file and no conversion in
    /// flight.
    pub fn can_convert(&self) -> bool {
        self.file.is_some() && !self.phase.is_busy()
    }
}
