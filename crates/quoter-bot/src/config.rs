//! Application configuration.

use crate::error::{AppError, AppResult};
use quoter_mm::TraderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "QUOTER_CONFIG";
/// Configuration file used when neither the CLI nor the environment names one.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
/// Prefix for per-key environment overrides, e.g. `QUOTER__TRADER__POSITION_LIMIT`.
const ENV_OVERRIDE_PREFIX: &str = "QUOTER";

/// Journal replay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSON-lines event journal to replay.
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Where emitted order actions are written, one JSON object per line.
    #[serde(default = "default_actions_path")]
    pub actions_path: String,
    /// Pace dispatch to the journal timestamps instead of replaying as fast
    /// as possible. Handlers see the journal clock either way.
    #[serde(default)]
    pub realtime: bool,
}

fn default_events_path() -> String {
    "data/events.jsonl".to_string()
}

fn default_actions_path() -> String {
    "data/actions.jsonl".to_string()
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            actions_path: default_actions_path(),
            realtime: false,
        }
    }
}

/// Telemetry output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Write the Prometheus text exposition here when the session ends.
    #[serde(default)]
    pub metrics_path: Option<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub trader: TraderConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Resolve the config file (CLI argument > `QUOTER_CONFIG` > default
    /// path) and load it with environment overrides. A file named
    /// explicitly must exist; a missing default file means defaults.
    pub fn load(cli_path: Option<&str>) -> AppResult<Self> {
        let explicit = cli_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok());
        let required = explicit.is_some();
        let config_path = explicit.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if !Path::new(&config_path).exists() {
            if required {
                return Err(AppError::Config(format!(
                    "Config file not found: {config_path}"
                )));
            }
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
        }

        tracing::info!(path = %config_path, "Loading configuration");
        Self::from_file_with_env(&config_path)
    }

    /// Load from a file, then apply `QUOTER__SECTION__KEY` environment
    /// overrides on top. The file is optional.
    pub fn from_file_with_env(path: &str) -> AppResult<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::new(path, ::config::FileFormat::Toml).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_OVERRIDE_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Reject configurations the trader cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        self.trader.validate()?;
        if self.replay.events_path.is_empty() {
            return Err(AppError::Config("replay.events_path is empty".to_string()));
        }
        if self.replay.actions_path.is_empty() {
            return Err(AppError::Config("replay.actions_path is empty".to_string()));
        }
        Ok(())
    }
}
