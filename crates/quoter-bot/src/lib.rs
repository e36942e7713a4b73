//! Journal replay driver for the quoting core.
//!
//! Orchestrates:
//! - Configuration loading (TOML file plus environment overrides)
//! - Event journal replay into the trader
//! - Order action output as JSON lines
//! - Metrics and session summary

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, ReplaySummary};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
