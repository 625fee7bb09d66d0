//! Structured logging for Goyave.
//!
//! Logging is set up from a loaded [`Config`](goyave_config::Config). The
//! crate registers its own `log` category so that a configuration file can
//! tune the output without code changes:
//!
//! ```json
//! {
//!   "app": { "name": "my-app", "debug": false },
//!   "log": { "level": "warn", "format": "json" }
//! }
//! ```
//!
//! When `log.level` or `log.format` is left unset, `app.debug` decides:
//! debug mode logs at `debug` with pretty output, otherwise `info` as JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use goyave_config::Registry;
//! use goyave_telemetry::{init_logging, register_entries, LogConfig};
//!
//! let registry = Registry::global();
//! register_entries(registry)?;
//!
//! let config = registry.loader().with_file("config.json")?.load()?;
//! init_logging(&LogConfig::from_config(&config)?)?;
//!
//! tracing::info!(port = config.get_int("server.port"), "server starting");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, register_entries, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
