//! Tracing Setup
//!
//! `TigerStyle`: Optional observability with graceful fallback. The library
//! itself only emits `tracing` events; installing a subscriber is the host
//! application's call, and this helper covers the common case.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
pub const LOG_FILTER_DEFAULT: &str = "info";

/// Telemetry setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("tracing subscriber initialization failed: {reason}")]
    InitFailed { reason: String },
}

/// Install a formatted `tracing` subscriber filtered by `RUST_LOG`.
///
/// Call once at startup. Fails if another subscriber is already installed,
/// which hosts that bring their own telemetry can safely ignore.
pub fn init_tracing() -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LOG_FILTER_DEFAULT));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| TelemetryError::InitFailed {
            reason: e.to_string(),
        })
}
