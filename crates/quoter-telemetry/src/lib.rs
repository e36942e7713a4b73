//! Prometheus metrics and structured logging for the quoting core.
//!
//! - Prometheus counters and gauges for quotes, hedges and positions
//! - Structured logging with tracing (JSON in production)
//! - Session summary built from the collected metrics

pub mod error;
pub mod logging;
pub mod metrics;
pub mod session_stats;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
pub use session_stats::{SessionReporter, SessionStats};
