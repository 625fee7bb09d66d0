//! The registration ledger.
//!
//! Modules describe the entries they consume by registering them into a
//! [`Registry`]. Every [`Config`](crate::Config) starts as a deep copy of the
//! registry's defaults tree.

use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::trace;

use crate::category::Category;
use crate::entry::Entry;
use crate::error::SchemaError;
use crate::loader::ConfigLoader;

/// Schema registry holding the default configuration tree.
///
/// Registration is synchronized so independent modules may register from
/// different threads.
///
/// # Example
///
/// ```
/// use goyave_config::{Entry, Kind, Registry};
///
/// let registry = Registry::empty();
/// registry.register("app.name", Entry::new(Kind::String).with_value("goyave"));
///
/// // Identical re-registration is a no-op.
/// registry.register("app.name", Entry::new(Kind::String).with_value("goyave"));
///
/// let config = registry.loader().load().unwrap();
/// assert_eq!(config.get_string("app.name"), "goyave");
/// ```
#[derive(Debug)]
pub struct Registry {
    defaults: Mutex<Category>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry seeded with the built-in framework entries.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        for (key, entry) in crate::defaults::entries() {
            registry.register(key, entry);
        }
        registry
    }

    /// Create a registry with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            defaults: Mutex::new(Category::default()),
        }
    }

    /// Process-wide registry used by the free functions of this crate.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register an entry at a dotted key.
    ///
    /// Registering an entry equal to the one already present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Conflict`] if a different entry is registered
    /// at `key`, or a path error if `key` is malformed or collides with a
    /// category.
    pub fn try_register(&self, key: &str, entry: Entry) -> Result<(), SchemaError> {
        let mut defaults = self.defaults.lock();
        let (category, leaf, exists) = defaults.walk(key)?;
        if exists {
            return match category.entry(leaf) {
                Some(registered) if *registered == entry => Ok(()),
                _ => Err(SchemaError::Conflict {
                    key: key.to_string(),
                }),
            };
        }
        trace!(key, kind = %entry.type_name(), "registered config entry");
        category.insert(leaf, entry);
        Ok(())
    }

    /// Register an entry, panicking on schema errors.
    ///
    /// Meant for module initialization, where a conflict is a programming
    /// error that must stop the process.
    pub fn register(&self, key: &str, entry: Entry) {
        if let Err(err) = self.try_register(key, entry) {
            panic!("{err}");
        }
    }

    /// Deep copy of the defaults tree.
    pub fn defaults(&self) -> Category {
        self.defaults.lock().clone()
    }

    /// Start loading a configuration seeded from this registry.
    pub fn loader(&self) -> ConfigLoader<'_> {
        ConfigLoader::with_registry(self)
    }
}

/// Register an entry into the [global registry](Registry::global).
///
/// # Panics
///
/// Panics if a different entry is already registered at `key`.
pub fn register(key: &str, entry: Entry) {
    Registry::global().register(key, entry);
}
