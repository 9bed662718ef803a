//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("global subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Install the global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_directive`.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInstalled(e.to_string()))
}
