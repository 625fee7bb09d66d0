//! Structured logging configured from a Goyave [`Config`].
//!
//! # Example
//!
//! ```rust,ignore
//! use goyave_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(key = "server.port", "config entry overridden");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use goyave_config::{Config, Entry, Kind, Registry, Value};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Key of the log level entry.
pub const LEVEL_KEY: &str = "log.level";

/// Key of the log format entry.
pub const FORMAT_KEY: &str = "log.format";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const FORMATS: [&str; 2] = ["json", "pretty"];

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "goyave_config=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Application name, attached to the root span.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Human-readable output at `debug` level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            include_target: true,
            service_name: "goyave".to_string(),
        }
    }

    /// JSON output at `info` level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
            service_name: "goyave".to_string(),
        }
    }

    /// Derives the logging setup from a loaded configuration.
    ///
    /// `app.debug` picks the development or production preset, then
    /// `log.level` and `log.format` override it when set. Missing entries
    /// are tolerated so that a configuration loaded without
    /// [`register_entries`] still works.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfig`] if `log.level` or
    /// `log.format` holds an unknown value.
    pub fn from_config(config: &Config) -> TelemetryResult<Self> {
        let debug = config
            .get("app.debug")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let mut log = if debug {
            Self::development()
        } else {
            Self::production()
        };

        if let Some(name) = config.get("app.name").and_then(Value::as_str) {
            log.service_name = name.to_string();
        }

        if let Some(level) = config.get(LEVEL_KEY) {
            let level = level.as_str().filter(|l| LEVELS.contains(l)).ok_or_else(|| {
                TelemetryError::InvalidConfig(format!("unknown log level {level}"))
            })?;
            log.level = level.to_string();
        }

        if let Some(format) = config.get(FORMAT_KEY) {
            log.json_format = match format.as_str() {
                Some("json") => true,
                Some("pretty") => false,
                _ => {
                    return Err(TelemetryError::InvalidConfig(format!(
                        "unknown log format {format}"
                    )))
                }
            };
        }

        Ok(log)
    }
}

/// Registers the `log` category.
///
/// Both entries are optional and unset by default. Registering twice is a
/// no-op.
///
/// # Errors
///
/// Returns [`TelemetryError::Schema`] if another module registered
/// different entries under the same keys.
pub fn register_entries(registry: &Registry) -> TelemetryResult<()> {
    registry.try_register(LEVEL_KEY, Entry::new(Kind::String).authorized(LEVELS))?;
    registry.try_register(FORMAT_KEY, Entry::new(Kind::String).authorized(FORMATS))?;
    Ok(())
}

/// Initializes the global subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the level is not a valid filter
/// or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let result = if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);
        tracing_subscriber::registry().with(fmt_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);
        tracing_subscriber::registry().with(fmt_layer).try_init()
    };
    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service.name = %config.service_name,
        level = %config.level,
        json = config.json_format,
        "logging initialized"
    );
    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}
