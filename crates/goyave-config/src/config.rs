//! Loaded configuration instances.
//!
//! This module provides [`Config`], the read-mostly tree produced by a
//! [`ConfigLoader`](crate::ConfigLoader).

use serde::de::DeserializeOwned;

use crate::category::{check_key, Category};
use crate::entry::Entry;
use crate::error::{ConfigError, ConfigResult, Violation};
use crate::value::Value;

/// A loaded configuration.
///
/// A `Config` is meant to be loaded once at startup and then only read.
/// It has no internal locking: it can be shared between threads behind an
/// `Arc`, but [`set`](Config::set) must not race with readers.
///
/// # Example
///
/// ```
/// use goyave_config::{Entry, Kind, Registry};
///
/// let registry = Registry::empty();
/// registry.register("server.port", Entry::new(Kind::Int).with_value(8080));
///
/// let mut config = registry.loader().load().unwrap();
/// assert_eq!(config.get_int("server.port"), 8080);
///
/// config.set("server.port", 3000);
/// assert_eq!(config.get_int("server.port"), 3000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: Category,
}

impl Config {
    pub(crate) fn new(root: Category) -> Self {
        Self { root }
    }

    /// The configuration tree.
    pub fn root(&self) -> &Category {
        &self.root
    }

    /// Value at a dotted key.
    ///
    /// Returns `None` if the key doesn't exist, designates a category, or the
    /// entry is unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root
            .entry(key)
            .map(|entry| &entry.value)
            .filter(|value| !value.is_null())
    }

    /// Returns `true` if [`get`](Config::get) would return a value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn expect(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(value) => value,
            None => panic!("config entry \"{key}\" doesn't exist"),
        }
    }

    /// String value at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not a string.
    pub fn get_string(&self, key: &str) -> &str {
        match self.expect(key) {
            Value::String(s) => s,
            _ => panic!("config entry \"{key}\" is not a string"),
        }
    }

    /// Boolean value at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not a bool.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.expect(key) {
            Value::Bool(b) => *b,
            _ => panic!("config entry \"{key}\" is not a bool"),
        }
    }

    /// Integer value at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not an int.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.expect(key) {
            Value::Int(i) => *i,
            _ => panic!("config entry \"{key}\" is not an int"),
        }
    }

    /// Float value at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not a float.
    pub fn get_float(&self, key: &str) -> f64 {
        match self.expect(key) {
            Value::Float(f) => *f,
            _ => panic!("config entry \"{key}\" is not a float"),
        }
    }

    fn expect_list(&self, key: &str, kind: &str) -> &[Value] {
        match self.expect(key) {
            Value::List(items) => items,
            _ => panic!("config entry \"{key}\" is not a {kind} slice"),
        }
    }

    /// String slice at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not a string slice.
    pub fn get_string_slice(&self, key: &str) -> Vec<&str> {
        self.expect_list(key, "string")
            .iter()
            .map(|item| {
                item.as_str()
                    .unwrap_or_else(|| panic!("config entry \"{key}\" is not a string slice"))
            })
            .collect()
    }

    /// Boolean slice at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not a bool slice.
    pub fn get_bool_slice(&self, key: &str) -> Vec<bool> {
        self.expect_list(key, "bool")
            .iter()
            .map(|item| {
                item.as_bool()
                    .unwrap_or_else(|| panic!("config entry \"{key}\" is not a bool slice"))
            })
            .collect()
    }

    /// Integer slice at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not an int slice.
    pub fn get_int_slice(&self, key: &str) -> Vec<i64> {
        self.expect_list(key, "int")
            .iter()
            .map(|item| {
                item.as_int()
                    .unwrap_or_else(|| panic!("config entry \"{key}\" is not an int slice"))
            })
            .collect()
    }

    /// Float slice at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is missing, unset or not a float slice.
    pub fn get_float_slice(&self, key: &str) -> Vec<f64> {
        self.expect_list(key, "float")
            .iter()
            .map(|item| {
                item.as_float()
                    .unwrap_or_else(|| panic!("config entry \"{key}\" is not a float slice"))
            })
            .collect()
    }

    /// Set the value at a dotted key.
    ///
    /// An existing entry keeps its schema: the new value is validated against
    /// it and the previous value is restored if validation fails. A missing
    /// key gets a new unconstrained entry whose kind is inferred from the
    /// value, creating intermediate categories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the value is rejected and
    /// [`ConfigError::Schema`] if the key is malformed or collides with a
    /// category. The tree is unchanged in both cases.
    pub fn try_set(&mut self, key: &str, value: impl Into<Value>) -> ConfigResult<()> {
        check_key(key)?;
        let value = value.into();

        if let Some(entry) = self.root.entry_mut(key) {
            let previous = entry.clone();
            entry.value = value;
            if let Err(violation) = entry.validate(key) {
                *entry = previous;
                return Err(violation.into());
            }
            return Ok(());
        }

        let mut entry = Entry::infer(value).ok_or_else(|| Violation::UnsupportedValue {
            key: key.to_string(),
        })?;
        entry.validate(key)?;
        let (category, leaf, _) = self.root.walk(key)?;
        category.insert(leaf, entry);
        Ok(())
    }

    /// Set the value at a dotted key, panicking if it is rejected.
    ///
    /// # Panics
    ///
    /// Panics in every case where [`try_set`](Config::try_set) returns an
    /// error. The previous value is restored first.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        if let Err(err) = self.try_set(key, value) {
            panic!("{err}");
        }
    }

    /// Deserialize the category at `key` into a typed struct.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSection`] if no category exists at `key`
    /// and [`ConfigError::Section`] if it doesn't fit `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use goyave_config::{load_default, ServerSettings};
    ///
    /// let config = load_default().unwrap();
    /// let server: ServerSettings = config.section("server").unwrap();
    /// assert_eq!(server.port, 8080);
    /// ```
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let category = self
            .root
            .category(key)
            .ok_or_else(|| ConfigError::MissingSection {
                key: key.to_string(),
            })?;
        serde_json::from_value(category.to_json()).map_err(|source| ConfigError::Section {
            key: key.to_string(),
            source,
        })
    }

    /// The whole tree as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }
}
