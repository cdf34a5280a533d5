//! Configuration types for talking to the conversion services.
//!
//! Everything the controller needs to know about the outside world lives in
//! [`ClientConfig`], built via its [`ClientConfigBuilder`]: where the two
//! services are, how long to wait for them, and how large an upload they
//! accept. The two user-facing selections ([`OutputMode`] and [`Backend`])
//! are plain enums that also serialise into the view state.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default endpoint of the basic (marker) conversion service.
pub const DEFAULT_BASIC_URL: &str =
    "https://siddhant-ugarkar--marker-tool-service-fastapi-app.modal.run/convert";

/// Default endpoint of the layout-aware (surya) conversion service.
pub const DEFAULT_LAYOUT_URL: &str =
    "https://siddhant-ugarkar--surya-tool-service-fastapi-app.modal.run/convert";

/// Both services reject uploads above 20 MiB with HTTP 413.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Configuration for a [`crate::Controller`].
///
/// # Example
/// ```rust
/// use pdf_converter::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .basic_url("http://localhost:8000/convert")
///     .timeout_secs(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, Some(300));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint of the basic extraction service (marker).
    pub basic_url: String,

    /// Endpoint of the layout/OCR-aware extraction service (surya).
    pub layout_url: String,

    /// Per-request timeout in seconds. Default: None (wait indefinitely).
    ///
    /// Conversion of a long document on a cold serverless container can take
    /// minutes, so no timeout is applied unless the caller asks for one.
    pub timeout_secs: Option<u64>,

    /// Largest upload sent to a service. Default: 20 MiB.
    pub max_upload_bytes: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            basic_url: DEFAULT_BASIC_URL.to_string(),
            layout_url: DEFAULT_LAYOUT_URL.to_string(),
            timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            user_agent: concat!("pdf-converter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Endpoint URL for the given backend.
    pub fn endpoint(&self, backend: Backend) -> &str {
        match backend {
            Backend::Basic => &self.basic_url,
            Backend::Layout => &self.layout_url,
        }
    }

    /// Health-check URL for the given backend.
    ///
    /// Both services serve `GET /health` next to `POST /convert`.
    pub fn health_url(&self, backend: Backend) -> String {
        let endpoint = self.endpoint(backend).trim_end_matches('/');
        match endpoint.strip_suffix("/convert") {
            Some(base) => format!("{base}/health"),
            None => format!("{endpoint}/health"),
        }
    }

    /// Request timeout as a `Duration`, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP client used for every request of a controller.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, ConvertError> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| ConvertError::Internal(format!("Failed to build HTTP client: {e}")))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn basic_url(mut self, url: impl Into<String>) -> Self {
        self.config.basic_url = url.into();
        self
    }

    pub fn layout_url(mut self, url: impl Into<String>) -> Self {
        self.config.layout_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ConvertError> {
        let c = &self.config;
        for (name, url) in [("basic", &c.basic_url), ("layout", &c.layout_url)] {
            let parsed = reqwest::Url::parse(url).map_err(|e| {
                ConvertError::InvalidConfig(format!("{name} endpoint '{url}' is not a URL: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConvertError::InvalidConfig(format!(
                    "{name} endpoint must be http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }
        if c.timeout_secs == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(ConvertError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The format requested from the conversion service.
///
/// Selects both the `output` query parameter and the way the response body
/// is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// ZIP bundle with Markdown, page images and metadata. (default)
    #[default]
    Markdown,
    /// A single JSON metadata document.
    Json,
}

impl OutputMode {
    /// Wire value used in the `output` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Markdown => "markdown",
            OutputMode::Json => "json",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputMode::Markdown),
            "json" => Ok(OutputMode::Json),
            other => Err(ConvertError::InvalidConfig(format!(
                "Unknown output mode '{other}' (expected markdown or json)"
            ))),
        }
    }
}

/// Which conversion service handles the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Basic text and image extraction (marker). (default)
    #[default]
    Basic,
    /// Layout-aware extraction with OCR and annotated page images (surya).
    Layout,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Basic => "basic",
            Backend::Layout => "layout",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "marker" | "pymupdf" => Ok(Backend::Basic),
            "layout" | "surya" => Ok(Backend::Layout),
            other => Err(ConvertError::InvalidConfig(format!(
                "Unknown backend '{other}' (expected basic or layout)"
            ))),
        }
    }
}
