//! Configuration error types.
//!
//! Three layers of errors exist:
//!
//! - [`SchemaError`]: programmer mistakes (bad keys, conflicting registrations).
//!   These are raised at registration time and are never caused by a config file.
//! - [`Violation`]: a single problem found while loading or validating data.
//! - [`ConfigError`]: what the loader and [`Config::try_set`](crate::Config::try_set)
//!   return. Every violation found in one pass is carried by [`Violations`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or mutating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The root of a configuration document is not a JSON object.
    #[error("configuration document root must be a JSON object")]
    NotAnObject,

    /// One or more entries are invalid.
    #[error("{0}")]
    Invalid(Violations),

    /// A key could not be addressed in the tree.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A category could not be turned into the requested type.
    #[error("cannot read config category \"{key}\": {source}")]
    Section {
        /// Dotted path of the category.
        key: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// No category exists at the requested path.
    #[error("config category \"{key}\" doesn't exist")]
    MissingSection {
        /// Dotted path of the category.
        key: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Returns the individual violations if this is a validation failure.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(violations) => violations.as_slice(),
            _ => &[],
        }
    }
}

impl From<Violations> for ConfigError {
    fn from(violations: Violations) -> Self {
        Self::Invalid(violations)
    }
}

impl From<Violation> for ConfigError {
    fn from(violation: Violation) -> Self {
        Self::Invalid(Violations(vec![violation]))
    }
}

/// Errors caused by the calling code rather than by configuration data.
///
/// [`Registry::register`](crate::Registry::register) and
/// [`Config::set`](crate::Config::set) panic with these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Empty key, trailing dot or empty path segment.
    #[error("invalid config key \"{key}\": path segments cannot be empty")]
    InvalidKey {
        /// The offending key.
        key: String,
    },

    /// A path goes through an entry.
    #[error("attempted to add an entry to non-category \"{key}\"")]
    EntryNotCategory {
        /// Path of the entry found where a category was expected.
        key: String,
    },

    /// A path designates a category where an entry was expected.
    #[error("attempted to replace the \"{key}\" category with an entry")]
    CategoryNotEntry {
        /// Path of the category.
        key: String,
    },

    /// A different entry is already registered at this key.
    #[error("attempted to override registered config entry \"{key}\"")]
    Conflict {
        /// The registered key.
        key: String,
    },
}

/// A single problem found in configuration data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    /// The entry is required but unset.
    #[error("\"{key}\" is required")]
    Required {
        /// Dotted key of the entry.
        key: String,
    },

    /// The value doesn't match the declared kind and cannot be coerced.
    #[error("\"{key}\" type must be {expected}")]
    TypeMismatch {
        /// Dotted key of the entry.
        key: String,
        /// Expected type, e.g. `int` or `[]string`.
        expected: String,
    },

    /// The value is not in the authorized set.
    #[error("\"{key}\" must have one of the following values: {allowed}")]
    Unauthorized {
        /// Dotted key of the entry.
        key: String,
        /// Rendered list of authorized values.
        allowed: String,
    },

    /// At least one element of a slice is not in the authorized set.
    #[error("\"{key}\" elements must have one of the following values: {allowed}")]
    UnauthorizedElement {
        /// Dotted key of the entry.
        key: String,
        /// Rendered list of authorized values.
        allowed: String,
    },

    /// The `${VAR}` placeholder references an unset variable.
    #[error("\"{key}\": \"{var}\" environment variable is not set")]
    EnvNotSet {
        /// Dotted key of the entry.
        key: String,
        /// Environment variable name.
        var: String,
    },

    /// The environment variable's value doesn't parse as the declared kind.
    #[error("\"{key}\" could not be converted to {kind} from environment variable \"{var}\" of value \"{raw}\"")]
    EnvConversion {
        /// Dotted key of the entry.
        key: String,
        /// Environment variable name.
        var: String,
        /// Declared kind.
        kind: String,
        /// Raw variable value.
        raw: String,
    },

    /// Slices cannot be sourced from a single environment variable.
    #[error("\"{key}\": environment variable placeholders cannot be used on slice entries")]
    EnvOnSlice {
        /// Dotted key of the entry.
        key: String,
    },

    /// A document tried to replace an entry with a nested object.
    #[error("cannot override entry \"{key}\" with a category")]
    EntryOverriddenByCategory {
        /// Dotted key of the entry.
        key: String,
    },

    /// A document tried to replace a category with a value.
    #[error("cannot override category \"{key}\" with an entry")]
    CategoryOverriddenByEntry {
        /// Dotted key of the category.
        key: String,
    },

    /// No entry kind can be inferred for an unregistered value.
    #[error("\"{key}\" holds a value of unsupported type")]
    UnsupportedValue {
        /// Dotted key of the entry.
        key: String,
    },
}

impl Violation {
    /// Dotted key the violation is about.
    pub fn key(&self) -> &str {
        match self {
            Self::Required { key }
            | Self::TypeMismatch { key, .. }
            | Self::Unauthorized { key, .. }
            | Self::UnauthorizedElement { key, .. }
            | Self::EnvNotSet { key, .. }
            | Self::EnvConversion { key, .. }
            | Self::EnvOnSlice { key }
            | Self::EntryOverriddenByCategory { key }
            | Self::CategoryOverriddenByEntry { key }
            | Self::UnsupportedValue { key } => key,
        }
    }
}

/// Every violation found during one load or validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Violations(pub(crate) Vec<Violation>);

impl Violations {
    /// Returns the violations in the order they were found.
    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    /// Returns `true` when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid config:")?;
        for violation in &self.0 {
            write!(f, "\n\t- {violation}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
