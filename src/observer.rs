//! Observer trait for controller events.
//!
//! The controller never draws anything itself. Whatever front end hosts it
//! (the `pdfconv` terminal UI, a test harness, a web view) injects an
//! [`Arc<dyn ControllerObserver>`] via [`crate::Controller::with_observer`] and
//! receives the three things an interface needs to show: the busy
//! indicator, user-facing alerts, and the arrival of a new result.
//!
//! # Example
//!
//! ```rust
//! use pdf_converter::{ControllerObserver, Controller, ClientConfig};
//! use std::sync::Arc;
//!
//! struct StderrAlerts;
//!
//! impl ControllerObserver for StderrAlerts {
//!     fn on_alert(&self, message: &str) {
//!         eprintln!("error: {message}");
//!     }
//! }
//!
//! let controller = Controller::new(ClientConfig::default())
//!     .unwrap()
//!     .with_observer(Arc::new(StderrAlerts));
//! ```

use crate::output::ConversionResult;
use std::sync::Arc;

/// Receives interface events from a [`crate::Controller`].
///
/// All methods have default no-op implementations so observers only
/// override what they care about. Implementations must be `Send + Sync` so
/// a controller can move across tokio tasks.
pub trait ControllerObserver: Send + Sync {
    /// The busy indicator changed.
    ///
    /// Called with `true` when a conversion starts and with `false` when it
    /// ends, on the success path and on every failure path.
    fn on_busy_changed(&self, busy: bool) {
        let _ = busy;
    }

    /// A conversion failed; show `message` to the user.
    ///
    /// Fired exactly once per failed `convert` call.
    fn on_alert(&self, message: &str) {
        let _ = message;
    }

    /// A conversion succeeded and `result` is now displayed.
    fn on_result(&self, result: &ConversionResult) {
        let _ = result;
    }
}

/// A no-op implementation for callers that don't need interface events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl ControllerObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::Controller`].
pub type Observer = Arc<dyn ControllerObserver>;
