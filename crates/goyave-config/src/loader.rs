//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for building a [`Config`] from a
//! [`Registry`]'s defaults and any number of JSON documents, plus the
//! [`load`], [`load_from`], [`load_json`] and [`load_default`] shortcuts that
//! use the global registry.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn, Level};

use crate::error::{ConfigError, ConfigResult, Violations};
use crate::registry::Registry;
use crate::Config;

/// Environment variable selecting the configuration file.
pub const ENV_VARIABLE: &str = "GOYAVE_ENV";

type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Registered defaults
/// 2. JSON documents, in the order they were added
///
/// `${VAR}` placeholders are resolved from the process environment when the
/// whole tree is validated in [`load`](ConfigLoader::load).
///
/// # Example
///
/// ```no_run
/// use goyave_config::ConfigLoader;
///
/// # fn main() -> Result<(), goyave_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_dotenv()
///     .with_file("config.json")?
///     .with_optional_file("config.local.json")?
///     .load()?;
///
/// println!("Server will listen on port {}", config.get_int("server.port"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader<'r> {
    registry: &'r Registry,
    layers: Vec<JsonObject>,
}

impl Default for ConfigLoader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader<'static> {
    /// Create a loader seeded from the [global registry](Registry::global).
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Registry::global())
    }
}

impl<'r> ConfigLoader<'r> {
    /// Create a loader seeded from the given registry.
    #[must_use]
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self {
            registry,
            layers: Vec::new(),
        }
    }

    /// Add a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file is not a JSON object
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        debug!(path = %path.display(), "read configuration file");
        self.with_json(&content)
    }

    /// Add a JSON configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Add a JSON document given as a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is not valid JSON or its root is
    /// not an object.
    ///
    /// # Example
    ///
    /// ```
    /// use goyave_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_json(r#"{"server": {"port": 3000}}"#)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.get_int("server.port"), 3000);
    /// ```
    pub fn with_json(mut self, content: &str) -> ConfigResult<Self> {
        match serde_json::from_str::<serde_json::Value>(content)? {
            serde_json::Value::Object(map) => {
                self.layers.push(map);
                Ok(self)
            }
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// Load a `.env` file into the process environment.
    ///
    /// Variables already set are left untouched. A missing `.env` file is
    /// not an error, an unreadable or malformed one is logged as a warning.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        log_dotenv(&dotenvy::dotenv());
        self
    }

    /// Build the configuration.
    ///
    /// Copies the registry's defaults, merges every layer and validates the
    /// whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every conflict and invalid
    /// entry found. No configuration is returned in that case.
    pub fn load(self) -> ConfigResult<Config> {
        let mut root = self.registry.defaults();
        let mut violations = Violations::default();
        let layers = self.layers.len();

        for layer in self.layers {
            root.merge(layer, "", &mut violations);
        }
        root.validate("", &mut violations);
        violations.into_result()?;

        debug!(layers, "configuration loaded");
        Ok(Config::new(root))
    }
}

fn log_dotenv(result: &dotenvy::Result<PathBuf>) -> Level {
    match result {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env file");
            Level::DEBUG
        }
        Err(e) if e.not_found() => {
            debug!("no .env file found");
            Level::DEBUG
        }
        Err(e) => {
            warn!(error = %e, "failed to load .env file");
            Level::WARN
        }
    }
}

/// Name of the configuration file for an environment name.
///
/// `None`, empty, `local` and `localhost` select `config.json`; anything
/// else selects `config.<env>.json`. Comparison is case-insensitive.
pub fn config_file_name(environment: Option<&str>) -> String {
    let environment = environment.unwrap_or_default().to_lowercase();
    match environment.as_str() {
        "" | "local" | "localhost" => "config.json".to_string(),
        other => format!("config.{other}.json"),
    }
}

/// Path of the configuration file selected by [`ENV_VARIABLE`], relative to
/// the working directory.
///
/// # Errors
///
/// Returns an I/O error if the working directory cannot be determined.
pub fn config_path() -> ConfigResult<PathBuf> {
    let environment = env::var(ENV_VARIABLE).ok();
    Ok(env::current_dir()?.join(config_file_name(environment.as_deref())))
}

/// Load the configuration file selected by [`ENV_VARIABLE`] from the working
/// directory.
///
/// # Errors
///
/// See [`ConfigLoader::with_file`] and [`ConfigLoader::load`].
pub fn load() -> ConfigResult<Config> {
    load_from(config_path()?)
}

/// Load a configuration file.
///
/// # Errors
///
/// See [`ConfigLoader::with_file`] and [`ConfigLoader::load`].
pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
    ConfigLoader::new().with_file(path)?.load()
}

/// Load a configuration from a JSON string.
///
/// # Errors
///
/// See [`ConfigLoader::with_json`] and [`ConfigLoader::load`].
pub fn load_json(content: &str) -> ConfigResult<Config> {
    ConfigLoader::new().with_json(content)?.load()
}

/// Load the registered defaults only.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if a registered default is invalid, for
/// example a required entry without a value.
pub fn load_default() -> ConfigResult<Config> {
    ConfigLoader::new().load()
}
