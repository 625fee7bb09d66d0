//! Layered, typed configuration for Goyave.
//!
//! Configuration is a tree of dotted keys (`database.config.dryRun`) whose
//! leaves are typed [`Entry`] values. Modules describe the entries they
//! consume by registering them; a [`Config`] is then loaded by copying the
//! registered defaults, merging JSON documents on top and validating the
//! whole tree.
//!
//! - [`Registry`] - the registration ledger (schema and defaults)
//! - [`ConfigLoader`] - builds a [`Config`] from a registry and JSON layers
//! - [`Config`] - the loaded, read-mostly instance with typed getters
//!
//! # Example
//!
//! ```
//! use goyave_config::{Entry, Kind, Registry};
//!
//! let registry = Registry::new();
//! registry.register(
//!     "auth.jwt.expiry",
//!     Entry::new(Kind::Int).with_value(300).required(),
//! );
//!
//! let config = registry
//!     .loader()
//!     .with_json(r#"{"server": {"port": 3000.0}, "auth": {"jwt": {"expiry": 60}}}"#)
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(config.get_int("server.port"), 3000);
//! assert_eq!(config.get_int("auth.jwt.expiry"), 60);
//! ```
//!
//! # Configuration File Format
//!
//! Nested objects are categories, everything else is an entry value:
//!
//! ```json
//! {
//!   "app": { "name": "my-app", "debug": false },
//!   "server": {
//!     "port": 8080,
//!     "proxy": { "protocol": "https", "host": "example.org" }
//!   },
//!   "database": { "password": "${DB_PASSWORD}" }
//! }
//! ```
//!
//! The file is `config.json`, or `config.<env>.json` when the `GOYAVE_ENV`
//! environment variable is set to something other than `local`/`localhost`.
//!
//! # Environment Variables
//!
//! A string value of the exact form `${NAME}` is replaced by the value of the
//! `NAME` environment variable, parsed according to the entry's kind. A
//! missing variable fails the load.
//!
//! # Errors
//!
//! Loading reports every problem at once:
//!
//! ```text
//! invalid config:
//!     - "app.name" type must be string
//!     - "database.password": "DB_PASSWORD" environment variable is not set
//! ```

#![warn(missing_docs)]

mod category;
mod config;
mod defaults;
mod entry;
mod error;
mod loader;
mod registry;
mod schema;
mod value;

pub use category::{Category, Node};
pub use config::Config;
pub use entry::Entry;
pub use error::{ConfigError, ConfigResult, SchemaError, Violation, Violations};
pub use loader::{
    config_file_name, config_path, load, load_default, load_from, load_json, ConfigLoader,
    ENV_VARIABLE,
};
pub use registry::{register, Registry};
pub use schema::*;
pub use value::{Kind, Value};
