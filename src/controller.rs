//! The upload/render controller.
//!
//! [`Controller`] owns the [`ViewState`] and is the only thing that changes
//! it. Each public method is one user action: pick a file, flip a mode,
//! convert, download. `convert` sequences the [`crate::pipeline`] stages and
//! turns any failure into exactly one alert on the observer.
//!
//! ## One conversion at a time
//!
//! `convert` takes `&mut self`, so a second call on the same controller
//! cannot start until the first one has returned. The phase check at the
//! top of `convert` rejects a call that still observes
//! [`Phase::Converting`] with [`ConvertError::AlreadyConverting`].
//!
//! A `convert` future may be dropped before it completes (a timeout, a
//! `select!`, a front end closing the view). The busy indicator is still
//! cleared and the phase returns to [`Phase::Idle`], so the next call
//! starts normally.

use crate::config::{Backend, ClientConfig, OutputMode};
use crate::download::{self, Download};
use crate::error::ConvertError;
use crate::observer::{NoopObserver, Observer};
use crate::output::ConversionResult;
use crate::pipeline::{archive, input, upload};
use crate::state::{Phase, SelectedFile, ViewState};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Holds the view state and performs conversions against the configured
/// services.
pub struct Controller {
    config: ClientConfig,
    client: reqwest::Client,
    state: ViewState,
    observer: Observer,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("observer", &"<dyn ControllerObserver>")
            .finish()
    }
}

impl Controller {
    /// Create a controller with an empty view state.
    pub fn new(config: ClientConfig) -> Result<Self, ConvertError> {
        let client = config.http_client()?;
        Ok(Self {
            config,
            client,
            state: ViewState::default(),
            observer: Arc::new(NoopObserver),
        })
    }

    /// Attach the observer that receives busy, alert and result events.
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Result of the last successful conversion (empty before the first).
    pub fn result(&self) -> &ConversionResult {
        &self.state.result
    }

    pub fn is_busy(&self) -> bool {
        self.state.phase.is_busy()
    }

    // ── Selections ───────────────────────────────────────────────────────

    /// Replace the selected file.
    ///
    /// The previous result stays on display until the next `convert`.
    pub fn select_file(&mut self, file: SelectedFile) {
        input::check_advisory_filter(&file);
        info!("Selected '{}' ({} bytes)", file.name, file.size);
        self.state.file = Some(file);
    }

    /// Read `path` from disk and select it.
    pub async fn select_path(&mut self, path: impl AsRef<Path>) -> Result<(), ConvertError> {
        let file = input::load_file(path).await?;
        self.select_file(file);
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.state.file = None;
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        debug!("Output mode → {}", mode);
        self.state.output_mode = mode;
    }

    pub fn set_backend(&mut self, backend: Backend) {
        debug!("Backend → {}", backend);
        self.state.backend = backend;
    }

    // ── Conversion ───────────────────────────────────────────────────────

    /// Upload the selected file and replace the result with the response.
    ///
    /// # Errors
    /// Precondition failures ([`ConvertError::NoFileSelected`],
    /// [`ConvertError::AlreadyConverting`]) are returned without touching
    /// the state or raising an alert; the interface keeps the convert action
    /// disabled in those states. Every other failure clears the busy
    /// indicator, raises one alert, leaves the result empty and is returned.
    pub async fn convert(&mut self) -> Result<&ConversionResult, ConvertError> {
        if self.state.phase.is_busy() {
            return Err(ConvertError::AlreadyConverting);
        }
        let Some(file) = self.state.file.as_ref() else {
            return Err(ConvertError::NoFileSelected);
        };

        let start = Instant::now();
        let mode = self.state.output_mode;
        let backend = self.state.backend;
        self.state.result = ConversionResult::default();
        let busy = BusyGuard::enter(&mut self.state.phase, Arc::clone(&self.observer));

        let outcome = run_conversion(&self.client, &self.config, file, mode, backend).await;

        match outcome {
            Ok(result) => {
                busy.finish(Phase::Succeeded);
                info!(
                    "Conversion complete in {}ms via {} backend",
                    start.elapsed().as_millis(),
                    backend
                );
                self.state.result = result;
                self.observer.on_result(&self.state.result);
                Ok(&self.state.result)
            }
            Err(e) => {
                busy.finish(Phase::Failed);
                warn!("Conversion failed: {}", e);
                self.observer.on_alert(&e.to_string());
                Err(e)
            }
        }
    }

    /// Ask the current backend whether it is up.
    pub async fn health(&self) -> Result<bool, ConvertError> {
        let url = self.config.health_url(self.state.backend);
        upload::check_health(&self.client, &url).await
    }

    // ── Downloads ────────────────────────────────────────────────────────

    /// `converted.md` built from the current Markdown result.
    pub fn download_markdown(&self) -> Result<Download, ConvertError> {
        download::markdown(&self.state.result)
    }

    /// `metadata.json` built from the current metadata result.
    pub fn download_metadata(&self) -> Result<Download, ConvertError> {
        download::metadata(&self.state.result)
    }
}

async fn run_conversion(
    client: &reqwest::Client,
    config: &ClientConfig,
    file: &SelectedFile,
    mode: OutputMode,
    backend: Backend,
) -> Result<ConversionResult, ConvertError> {
    // The cap applies to what is sent, not to the advertised size.
    let size = file.bytes.len() as u64;
    if size > config.max_upload_bytes {
        return Err(ConvertError::FileTooLarge {
            name: file.name.clone(),
            size,
            limit: config.max_upload_bytes,
        });
    }

    let body = upload::send(client, config.endpoint(backend), file, mode).await?;

    // ZIP inflation and PNG header decoding are CPU-bound.
    tokio::task::spawn_blocking(move || match mode {
        OutputMode::Json => archive::parse_json(&body),
        OutputMode::Markdown => archive::unpack(&body),
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("Decoding task failed: {e}")))?
}

/// Holds the phase at `Converting` for the lifetime of one conversion.
///
/// Dropping the guard always clears the busy indicator. If the conversion
/// never reached [`BusyGuard::finish`] (its future was dropped mid-request),
/// the phase falls back to `Idle`.
struct BusyGuard<'a> {
    phase: &'a mut Phase,
    observer: Observer,
}

impl<'a> BusyGuard<'a> {
    fn enter(phase: &'a mut Phase, observer: Observer) -> Self {
        *phase = Phase::Converting;
        observer.on_busy_changed(true);
        Self { phase, observer }
    }

    fn finish(self, outcome: Phase) {
        *self.phase = outcome;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.phase.is_busy() {
            debug!("Conversion cancelled before completion");
            *self.phase = Phase::Idle;
        }
        self.observer.on_busy_changed(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output so tests can count warnings.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn controller() -> Controller {
        Controller::new(ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn convert_without_file_is_rejected() {
        let mut c = controller();
        let err = c.convert().await.unwrap_err();
        assert!(matches!(err, ConvertError::NoFileSelected));
        assert_eq!(c.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn oversized_file_fails_before_upload() {
        let config = ClientConfig::builder()
            .basic_url("http://127.0.0.1:9/convert")
            .max_upload_bytes(4)
            .build()
            .unwrap();
        let mut c = Controller::new(config).unwrap();
        c.select_file(SelectedFile::new("big.pdf", b"%PDF-1.7".to_vec()));

        let err = c.convert().await.unwrap_err();
        assert!(matches!(err, ConvertError::FileTooLarge { size: 8, limit: 4, .. }));
        assert_eq!(c.state().phase, Phase::Failed);
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn upload_cap_counts_the_bytes_not_the_size_field() {
        let config = ClientConfig::builder()
            .basic_url("http://127.0.0.1:9/convert")
            .max_upload_bytes(4)
            .build()
            .unwrap();
        let mut c = Controller::new(config).unwrap();
        c.select_file(SelectedFile {
            name: "big.pdf".into(),
            size: 1,
            bytes: b"%PDF-1.7".to_vec(),
        });

        let err = c.convert().await.unwrap_err();
        assert!(matches!(err, ConvertError::FileTooLarge { size: 8, limit: 4, .. }), "got: {err}");
    }

    #[tokio::test]
    async fn select_path_warns_once_for_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text").unwrap();

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut c = controller();
        c.select_path(&path).await.unwrap();

        assert_eq!(logs.contents().matches("uploading anyway").count(), 1);
        assert_eq!(c.state().file.as_ref().unwrap().name, "notes.txt");
    }

    #[test]
    fn selections_update_state() {
        let mut c = controller();
        c.set_output_mode(OutputMode::Json);
        c.set_backend(Backend::Layout);
        c.select_file(SelectedFile::new("a.pdf", b"%PDF".to_vec()));
        assert_eq!(c.state().output_mode, OutputMode::Json);
        assert_eq!(c.state().backend, Backend::Layout);
        assert!(c.state().can_convert());

        c.clear_file();
        assert!(!c.state().can_convert());
    }

    #[test]
    fn downloads_on_empty_result_fail() {
        let c = controller();
        assert!(c.download_markdown().is_err());
        assert!(c.download_metadata().is_err());
    }
}
