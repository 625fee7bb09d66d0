//! Typed leaf entries and their validation.

use std::env;

use crate::error::Violation;
use crate::value::{Kind, Value};

/// A typed, constrained leaf of the configuration tree.
///
/// # Example
///
/// ```
/// use goyave_config::{Entry, Kind};
///
/// let entry = Entry::new(Kind::String)
///     .with_value("http")
///     .authorized(["http", "https"]);
///
/// assert!(!entry.is_slice);
/// assert_eq!(entry.authorized_values.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Current value, [`Value::Null`] when unset.
    pub value: Value,
    /// Declared kind (element kind for slices).
    pub kind: Kind,
    /// Whether the value is a list of `kind`.
    pub is_slice: bool,
    /// Whether an unset value is an error.
    pub required: bool,
    /// Allow-list, empty means any value of the right kind.
    /// Constrains each element for slices.
    pub authorized_values: Vec<Value>,
    // Unregistered entry built by `infer`, its slices may hold nulls.
    inferred: bool,
    // String taken from the environment by the last substitution.
    resolved: Option<String>,
}

impl Entry {
    /// Create an unset, optional scalar entry of the given kind.
    #[must_use]
    pub fn new(kind: Kind) -> Self {
        Self {
            value: Value::Null,
            kind,
            is_slice: false,
            required: false,
            authorized_values: Vec::new(),
            inferred: false,
            resolved: None,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Make this a slice entry.
    #[must_use]
    pub fn slice(mut self) -> Self {
        self.is_slice = true;
        self
    }

    /// Make this entry required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the authorized values.
    #[must_use]
    pub fn authorized<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.authorized_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Build an unregistered entry whose kind is taken from the value itself.
    ///
    /// Lists take the common kind of their non-null elements, `float` when
    /// integers and floats are mixed, and fall back to `string` when there
    /// is none. Their `null` elements are kept as is. `Null` gives an unset
    /// string entry. Returns `None` when no kind can be inferred (objects,
    /// nested lists, lists mixing other kinds).
    pub fn infer(value: Value) -> Option<Self> {
        let (kind, is_slice) = match &value {
            Value::Null => (Kind::String, false),
            Value::List(items) => (common_kind(items)?, true),
            Value::Object(_) => return None,
            scalar => (Kind::of(scalar)?, false),
        };
        Some(Self {
            value,
            kind,
            is_slice,
            required: false,
            authorized_values: Vec::new(),
            inferred: true,
            resolved: None,
        })
    }

    /// Type as displayed in error messages, `[]<kind>` for slices.
    pub fn type_name(&self) -> String {
        if self.is_slice {
            format!("[]{}", self.kind)
        } else {
            self.kind.to_string()
        }
    }

    /// Validate and normalize the value.
    ///
    /// Resolves `${VAR}` placeholders, checks required-ness, coerces the value
    /// to the declared kind and checks it against the authorized values. The
    /// value is rewritten only when substitution or coercion changed it, so
    /// calling this again on a valid entry is a no-op.
    pub fn validate(&mut self, key: &str) -> Result<(), Violation> {
        self.substitute_env(key)?;

        if self.required && self.value.is_null() {
            return Err(Violation::Required {
                key: key.to_string(),
            });
        }
        if self.value.is_null() {
            return Ok(());
        }

        let coerced = if self.is_slice {
            self.value.as_list().and_then(|items| {
                items
                    .iter()
                    .map(|item| {
                        if self.inferred && item.is_null() {
                            Some(Value::Null)
                        } else {
                            self.kind.coerce(item)
                        }
                    })
                    .collect::<Option<Vec<_>>>()
                    .map(Value::List)
            })
        } else {
            self.kind.coerce(&self.value)
        };
        let Some(coerced) = coerced else {
            return Err(Violation::TypeMismatch {
                key: key.to_string(),
                expected: self.type_name(),
            });
        };
        if coerced != self.value {
            self.value = coerced;
        }

        self.check_authorized(key)
    }

    fn check_authorized(&self, key: &str) -> Result<(), Violation> {
        if self.authorized_values.is_empty() {
            return Ok(());
        }

        if let Value::List(items) = &self.value {
            if self.is_slice {
                if items.iter().all(|item| self.is_authorized(item)) {
                    return Ok(());
                }
                return Err(Violation::UnauthorizedElement {
                    key: key.to_string(),
                    allowed: self.render_authorized(),
                });
            }
        }

        if self.is_authorized(&self.value) {
            Ok(())
        } else {
            Err(Violation::Unauthorized {
                key: key.to_string(),
                allowed: self.render_authorized(),
            })
        }
    }

    fn is_authorized(&self, value: &Value) -> bool {
        self.authorized_values
            .iter()
            .any(|allowed| self.kind.coerce(allowed).as_ref() == Some(value))
    }

    fn render_authorized(&self) -> String {
        Value::List(self.authorized_values.clone()).to_string()
    }

    fn substitute_env(&mut self, key: &str) -> Result<(), Violation> {
        // Already substituted, a variable holding `${OTHER}` isn't resolved twice.
        if self.resolved.is_some() && self.value.as_str() == self.resolved.as_deref() {
            return Ok(());
        }
        let Some(var) = self.value.as_str().and_then(placeholder) else {
            return Ok(());
        };
        let var = var.to_string();

        if self.is_slice {
            return Err(Violation::EnvOnSlice {
                key: key.to_string(),
            });
        }

        let raw = match env::var(&var) {
            Ok(raw) => raw,
            Err(env::VarError::NotPresent) => {
                return Err(Violation::EnvNotSet {
                    key: key.to_string(),
                    var,
                })
            }
            Err(env::VarError::NotUnicode(raw)) => {
                return Err(self.conversion_error(key, var, raw.to_string_lossy().into_owned()))
            }
        };

        let parsed = match self.kind {
            Kind::String => Some(Value::String(raw.clone())),
            Kind::Int => raw.parse::<i64>().ok().map(Value::Int),
            Kind::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            Kind::Bool => parse_bool(&raw).map(Value::Bool),
        };

        match parsed {
            Some(value) => {
                self.resolved = value.as_str().map(str::to_string);
                self.value = value;
                Ok(())
            }
            None => Err(self.conversion_error(key, var, raw)),
        }
    }

    fn conversion_error(&self, key: &str, var: String, raw: String) -> Violation {
        Violation::EnvConversion {
            key: key.to_string(),
            var,
            kind: self.kind.to_string(),
            raw,
        }
    }
}

/// Common kind of the non-null elements of a list.
fn common_kind(items: &[Value]) -> Option<Kind> {
    let mut common = None;
    for item in items.iter().filter(|item| !item.is_null()) {
        let kind = Kind::of(item)?;
        common = match (common, kind) {
            (None, kind) => Some(kind),
            (Some(current), kind) if current == kind => Some(current),
            (Some(Kind::Int | Kind::Float), Kind::Int | Kind::Float) => Some(Kind::Float),
            _ => return None,
        };
    }
    Some(common.unwrap_or(Kind::String))
}

/// Variable name of a `${NAME}` placeholder.
fn placeholder(s: &str) -> Option<&str> {
    s.strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

/// Parse a boolean from an environment variable.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        assert_eq!(placeholder("${FOO}"), Some("FOO"));
        assert_eq!(placeholder("${}"), None);
        assert_eq!(placeholder("$FOO"), None);
        assert_eq!(placeholder("prefix ${FOO}"), None);
        assert_eq!(placeholder("${FOO"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("t"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("F"), Some(false));

        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool("tRuE"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_validate_unset_optional() {
        let mut entry = Entry::new(Kind::Int);
        assert!(entry.validate("key").is_ok());
        assert!(entry.value.is_null());
    }

    #[test]
    fn test_validate_required() {
        let mut entry = Entry::new(Kind::Int).required();
        let err = entry.validate("server.port").unwrap_err();
        assert_eq!(
            err,
            Violation::Required {
                key: "server.port".to_string()
            }
        );
    }

    #[test]
    fn test_validate_whole_float_becomes_int() {
        let mut entry = Entry::new(Kind::Int).with_value(5.0);
        entry.validate("entry").unwrap();
        assert_eq!(entry.value, Value::Int(5));

        // Second pass keeps the normalized value.
        entry.validate("entry").unwrap();
        assert_eq!(entry.value, Value::Int(5));
    }

    #[test]
    fn test_validate_fractional_float_rejected() {
        let mut entry = Entry::new(Kind::Int).with_value(5.5);
        let err = entry.validate("entry").unwrap_err();
        assert_eq!(err.to_string(), "\"entry\" type must be int");
    }

    #[test]
    fn test_validate_wrong_kind() {
        let mut entry = Entry::new(Kind::String).with_value(123);
        let err = entry.validate("app.name").unwrap_err();
        assert_eq!(err.to_string(), "\"app.name\" type must be string");
    }

    #[test]
    fn test_validate_slice() {
        let mut entry = Entry::new(Kind::Int)
            .slice()
            .with_value(vec![Value::Int(1), Value::Float(2.0)]);
        entry.validate("ids").unwrap();
        assert_eq!(entry.value, Value::from(vec![1, 2]));
    }

    #[test]
    fn test_validate_slice_wrong_element() {
        let mut entry = Entry::new(Kind::Int)
            .slice()
            .with_value(vec![Value::Int(1), Value::from("2")]);
        let err = entry.validate("ids").unwrap_err();
        assert_eq!(err.to_string(), "\"ids\" type must be []int");
    }

    #[test]
    fn test_validate_slice_requires_list() {
        let mut entry = Entry::new(Kind::String).slice().with_value("a");
        assert!(matches!(
            entry.validate("names"),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_scalar_rejects_list() {
        let mut entry = Entry::new(Kind::String).with_value(vec!["a"]);
        assert!(matches!(
            entry.validate("name"),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_authorized() {
        let mut entry = Entry::new(Kind::String)
            .with_value("ftp")
            .authorized(["http", "https"]);
        let err = entry.validate("server.proxy.protocol").unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"server.proxy.protocol\" must have one of the following values: [\"http\", \"https\"]"
        );

        entry.value = "https".into();
        assert!(entry.validate("server.proxy.protocol").is_ok());
    }

    #[test]
    fn test_validate_authorized_compares_after_coercion() {
        let mut entry = Entry::new(Kind::Float)
            .with_value(1)
            .authorized([1, 2]);
        entry.validate("ratio").unwrap();
        assert_eq!(entry.value, Value::Float(1.0));
    }

    #[test]
    fn test_validate_authorized_slice() {
        let mut entry = Entry::new(Kind::Int)
            .slice()
            .with_value(vec![1, 1, 2])
            .authorized([1, 2, 3]);
        assert!(entry.validate("levels").is_ok());

        entry.value = Value::from(vec![1, 2, 4]);
        assert!(matches!(
            entry.validate("levels"),
            Err(Violation::UnauthorizedElement { .. })
        ));

        entry.value = Value::List(Vec::new());
        assert!(entry.validate("levels").is_ok());
    }

    #[test]
    fn test_env_substitution_int() {
        temp_env::with_var("GOYAVE_ENTRY_TEST_INT", Some("42"), || {
            let mut entry = Entry::new(Kind::Int).with_value("${GOYAVE_ENTRY_TEST_INT}");
            entry.validate("entry").unwrap();
            assert_eq!(entry.value, Value::Int(42));
        });
    }

    #[test]
    fn test_env_substitution_float_and_bool() {
        temp_env::with_vars(
            [
                ("GOYAVE_ENTRY_TEST_FLOAT", Some("1.5")),
                ("GOYAVE_ENTRY_TEST_BOOL", Some("TRUE")),
            ],
            || {
                let mut entry = Entry::new(Kind::Float).with_value("${GOYAVE_ENTRY_TEST_FLOAT}");
                entry.validate("ratio").unwrap();
                assert_eq!(entry.value, Value::Float(1.5));

                let mut entry = Entry::new(Kind::Bool).with_value("${GOYAVE_ENTRY_TEST_BOOL}");
                entry.validate("flag").unwrap();
                assert_eq!(entry.value, Value::Bool(true));
            },
        );
    }

    #[test]
    fn test_env_substitution_string() {
        temp_env::with_var("GOYAVE_ENTRY_TEST_STR", Some("secret"), || {
            let mut entry = Entry::new(Kind::String).with_value("${GOYAVE_ENTRY_TEST_STR}");
            entry.validate("auth.jwt.secret").unwrap();
            assert_eq!(entry.value, Value::from("secret"));
        });
    }

    #[test]
    fn test_env_substitution_missing() {
        temp_env::with_var_unset("GOYAVE_ENTRY_TEST_MISSING", || {
            let mut entry = Entry::new(Kind::Int).with_value("${GOYAVE_ENTRY_TEST_MISSING}");
            let err = entry.validate("entry").unwrap_err();
            assert_eq!(
                err,
                Violation::EnvNotSet {
                    key: "entry".to_string(),
                    var: "GOYAVE_ENTRY_TEST_MISSING".to_string(),
                }
            );
        });
    }

    #[test]
    fn test_env_substitution_bad_value() {
        temp_env::with_var("GOYAVE_ENTRY_TEST_BAD", Some("b4d"), || {
            let mut entry = Entry::new(Kind::Int).with_value("${GOYAVE_ENTRY_TEST_BAD}");
            let err = entry.validate("entry").unwrap_err();
            assert_eq!(
                err.to_string(),
                "\"entry\" could not be converted to int from environment variable \"GOYAVE_ENTRY_TEST_BAD\" of value \"b4d\""
            );
        });
    }

    #[test]
    fn test_env_substitution_rejected_on_slice() {
        temp_env::with_var("GOYAVE_ENTRY_TEST_SLICE", Some("a"), || {
            let mut entry = Entry::new(Kind::String)
                .slice()
                .with_value("${GOYAVE_ENTRY_TEST_SLICE}");
            assert!(matches!(
                entry.validate("names"),
                Err(Violation::EnvOnSlice { .. })
            ));
        });
    }

    #[test]
    fn test_env_substitution_then_authorized() {
        temp_env::with_var("GOYAVE_ENTRY_TEST_PROTO", Some("ftp"), || {
            let mut entry = Entry::new(Kind::String)
                .with_value("${GOYAVE_ENTRY_TEST_PROTO}")
                .authorized(["http", "https"]);
            assert!(matches!(
                entry.validate("protocol"),
                Err(Violation::Unauthorized { .. })
            ));
        });
    }

    #[test]
    fn test_infer() {
        let entry = Entry::infer("v".into()).unwrap();
        assert_eq!(entry.kind, Kind::String);
        assert!(!entry.is_slice);
        assert!(!entry.required);
        assert!(entry.authorized_values.is_empty());

        let mut entry = Entry::infer(Value::from(vec![Value::Null, Value::Float(1.5)])).unwrap();
        assert_eq!(entry.kind, Kind::Float);
        assert!(entry.is_slice);
        entry.validate("ratios").unwrap();
        assert_eq!(entry.value, Value::from(vec![Value::Null, Value::Float(1.5)]));

        let entry = Entry::infer(Value::List(Vec::new())).unwrap();
        assert_eq!(entry.kind, Kind::String);
        assert!(entry.is_slice);

        let entry = Entry::infer(Value::Null).unwrap();
        assert_eq!(entry.kind, Kind::String);
        assert!(entry.value.is_null());

        assert!(Entry::infer(Value::Object(Default::default())).is_none());
        assert!(Entry::infer(Value::from(vec![vec![1]])).is_none());
        assert!(Entry::infer(Value::from(vec![Value::Int(1), Value::from("a")])).is_none());
    }

    #[test]
    fn test_infer_mixed_numbers_as_float() {
        let mut entry = Entry::infer(Value::from(vec![Value::Int(1), Value::Float(1.5)])).unwrap();
        assert_eq!(entry.kind, Kind::Float);
        entry.validate("ratios").unwrap();
        assert_eq!(entry.value, Value::from(vec![1.0, 1.5]));
        assert_eq!(entry.type_name(), "[]float");
    }

    #[test]
    fn test_inferred_slice_keeps_null_elements() {
        let mut entry = Entry::infer(Value::from(vec![Value::Null, Value::Int(1)])).unwrap();
        entry.validate("ids").unwrap();
        assert_eq!(entry.value, Value::from(vec![Value::Null, Value::Int(1)]));

        let mut entry = Entry::infer(Value::from(vec![Value::Null])).unwrap();
        assert_eq!(entry.kind, Kind::String);
        assert!(entry.validate("ids").is_ok());
    }

    #[test]
    fn test_registered_slice_rejects_null_elements() {
        let mut entry = Entry::new(Kind::Int)
            .slice()
            .with_value(vec![Value::Null, Value::Int(1)]);
        assert!(matches!(
            entry.validate("ids"),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_env_substitution_is_not_repeated() {
        temp_env::with_vars(
            [
                ("GOYAVE_ENTRY_TEST_OUTER", Some("${GOYAVE_ENTRY_TEST_INNER}")),
                ("GOYAVE_ENTRY_TEST_INNER", Some("inner")),
            ],
            || {
                let mut entry = Entry::new(Kind::String).with_value("${GOYAVE_ENTRY_TEST_OUTER}");
                entry.validate("entry").unwrap();
                assert_eq!(entry.value, Value::from("${GOYAVE_ENTRY_TEST_INNER}"));

                entry.validate("entry").unwrap();
                assert_eq!(entry.value, Value::from("${GOYAVE_ENTRY_TEST_INNER}"));

                // A new placeholder is resolved again.
                entry.value = Value::from("${GOYAVE_ENTRY_TEST_OUTER}");
                entry.validate("entry").unwrap();
                assert_eq!(entry.value, Value::from("${GOYAVE_ENTRY_TEST_INNER}"));
            },
        );
    }
}
