//! Telemetry error types.

use goyave_config::SchemaError;
use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The `log` configuration holds a value logging can't use.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The `log` entries conflict with entries already registered.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("failed".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: failed");

        let err = TelemetryError::InvalidConfig("bad format".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: bad format");
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err = TelemetryError::from(SchemaError::Conflict {
            key: "log.level".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "attempted to override registered config entry \"log.level\""
        );
    }
}
