//! Telemetry error types.

use thiserror::Error;

/// Failures while installing the subscriber or rendering metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already set, or the filter did not parse.
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    /// Prometheus text encoding failed.
    #[error("Metrics rendering failed: {0}")]
    Metrics(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
