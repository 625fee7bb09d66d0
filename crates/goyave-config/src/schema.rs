//! Typed views of the built-in categories.
//!
//! These structs mirror the entries registered by [`Registry::new`](crate::Registry::new)
//! and are read with [`Config::section`](crate::Config::section). They are
//! snapshots: later calls to [`Config::set`](crate::Config::set) are not
//! reflected.

use serde::{Deserialize, Serialize};

/// `app` category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Application name.
    pub name: String,
    /// Deployment environment name.
    pub environment: String,
    /// Debug mode.
    pub debug: bool,
    /// Fallback language for localization.
    pub default_language: String,
}

/// `server` category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Public domain name, empty when unset.
    pub domain: String,
    /// Bind port.
    pub port: i64,
    /// Write timeout in seconds.
    pub write_timeout: i64,
    /// Read timeout in seconds.
    pub read_timeout: i64,
    /// Read header timeout in seconds.
    pub read_header_timeout: i64,
    /// Idle timeout in seconds.
    pub idle_timeout: i64,
    /// Websocket close handshake timeout in seconds.
    pub websocket_close_timeout: i64,
    /// Maximum request body size in MiB.
    pub max_upload_size: f64,
    /// Reverse proxy settings used to build public URLs.
    pub proxy: ProxySettings,
}

impl ServerSettings {
    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `server.proxy` category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxySettings {
    /// `http` or `https`.
    pub protocol: String,
    /// Public host, `None` when the server is not behind a proxy.
    #[serde(default)]
    pub host: Option<String>,
    /// Public port.
    pub port: i64,
    /// Base path prefix.
    pub base: String,
}

impl ProxySettings {
    /// Public base URL, if a proxy host is configured.
    ///
    /// The port is omitted when it is the default port of the protocol.
    pub fn base_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let default_port = match self.protocol.as_str() {
            "https" => 443,
            _ => 80,
        };
        let url = if self.port == default_port {
            format!("{}://{}{}", self.protocol, host, self.base)
        } else {
            format!("{}://{}:{}{}", self.protocol, host, self.port, self.base)
        };
        Some(url)
    }
}

/// `database` category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSettings {
    /// Driver name, `none` disables the database.
    pub connection: String,
    /// Host.
    pub host: String,
    /// Port.
    pub port: i64,
    /// Database name.
    pub name: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Driver-specific DSN options.
    pub options: String,
    /// Connection pool size.
    pub max_open_connections: i64,
    /// Idle connections kept in the pool.
    pub max_idle_connections: i64,
    /// Connection lifetime in seconds.
    pub max_lifetime: i64,
    /// Read query timeout in milliseconds.
    pub default_read_query_timeout: i64,
    /// Write query timeout in milliseconds.
    pub default_write_query_timeout: i64,
    /// Mapper options.
    pub config: DatabaseOptions,
}

impl DatabaseSettings {
    /// Returns `false` when `connection` is `none`.
    pub fn enabled(&self) -> bool {
        self.connection != "none"
    }
}

/// `database.config` category.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseOptions {
    /// Don't wrap single writes in a transaction.
    pub skip_default_transaction: bool,
    /// Generate statements without executing them.
    pub dry_run: bool,
    /// Cache prepared statements.
    pub prepare_stmt: bool,
    /// Disable nested transactions.
    pub disable_nested_transaction: bool,
    /// Allow updates and deletes without conditions.
    pub allow_global_update: bool,
    /// Don't ping the database on connection.
    pub disable_automatic_ping: bool,
    /// Skip foreign key creation during migrations.
    pub disable_foreign_key_constraint_when_migrating: bool,
}
