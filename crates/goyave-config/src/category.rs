//! The configuration tree.
//!
//! A [`Category`] maps dot-free path segments to [`Node`]s, which are either
//! nested categories or leaf [`Entry`] values. Keys are kept sorted so that
//! violation reports come out in a stable order.

use std::collections::btree_map::{self, BTreeMap};

use tracing::warn;

use crate::entry::Entry;
use crate::error::{SchemaError, Violation, Violations};
use crate::value::Value;

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Interior node.
    Category(Category),
    /// Leaf node.
    Entry(Entry),
}

/// Interior node of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    children: BTreeMap<String, Node>,
}

impl Category {
    /// Create an empty category.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct child by segment name.
    pub fn child(&self, segment: &str) -> Option<&Node> {
        self.children.get(segment)
    }

    /// Iterate over direct children in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.children.iter()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the category has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Resolve a dotted path without modifying the tree.
    pub fn lookup(&self, key: &str) -> Option<&Node> {
        let mut segments = key.split('.');
        let mut node = self.children.get(segments.next()?)?;
        for segment in segments {
            match node {
                Node::Category(category) => node = category.children.get(segment)?,
                Node::Entry(_) => return None,
            }
        }
        Some(node)
    }

    /// Resolve a dotted path to an entry.
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        match self.lookup(key)? {
            Node::Entry(entry) => Some(entry),
            Node::Category(_) => None,
        }
    }

    /// Resolve a dotted path to a category.
    pub fn category(&self, key: &str) -> Option<&Category> {
        match self.lookup(key)? {
            Node::Category(category) => Some(category),
            Node::Entry(_) => None,
        }
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        let mut segments = key.split('.');
        let mut node = self.children.get_mut(segments.next()?)?;
        for segment in segments {
            match node {
                Node::Category(category) => node = category.children.get_mut(segment)?,
                Node::Entry(_) => return None,
            }
        }
        match node {
            Node::Entry(entry) => Some(entry),
            Node::Category(_) => None,
        }
    }

    /// Descend to the parent category of `key`, creating missing categories.
    ///
    /// Returns the parent, the leaf segment and whether an entry already
    /// exists at the leaf.
    pub(crate) fn walk<'a, 'k>(
        &'a mut self,
        key: &'k str,
    ) -> Result<(&'a mut Category, &'k str, bool), SchemaError> {
        check_key(key)?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };

        let mut current = self;
        if let Some(parents) = parents {
            let mut offset = 0;
            for segment in parents.split('.') {
                offset += segment.len();
                let node = current
                    .children
                    .entry(segment.to_string())
                    .or_insert_with(|| Node::Category(Category::default()));
                current = match node {
                    Node::Category(category) => category,
                    Node::Entry(_) => {
                        return Err(SchemaError::EntryNotCategory {
                            key: key[..offset].to_string(),
                        })
                    }
                };
                offset += 1;
            }
        }

        let existing = current
            .children
            .get(leaf)
            .map(|node| matches!(node, Node::Entry(_)));
        match existing {
            Some(false) => Err(SchemaError::CategoryNotEntry {
                key: key.to_string(),
            }),
            Some(true) => Ok((current, leaf, true)),
            None => Ok((current, leaf, false)),
        }
    }

    pub(crate) fn insert(&mut self, segment: &str, entry: Entry) {
        self.children
            .insert(segment.to_string(), Node::Entry(entry));
    }

    /// Merge a decoded JSON document into this category.
    ///
    /// Values of existing entries are replaced without validation. Keys that
    /// were never registered become unconstrained entries inferred from the
    /// value. Conflicts between categories and entries are reported for the
    /// whole document.
    pub(crate) fn merge(
        &mut self,
        source: serde_json::Map<String, serde_json::Value>,
        prefix: &str,
        violations: &mut Violations,
    ) {
        for (segment, value) in source {
            let key = join(prefix, &segment);
            match self.children.get_mut(&segment) {
                Some(Node::Category(category)) => match value {
                    serde_json::Value::Object(map) => category.merge(map, &key, violations),
                    _ => violations.push(Violation::CategoryOverriddenByEntry { key }),
                },
                Some(Node::Entry(entry)) => match value {
                    serde_json::Value::Object(_) => {
                        violations.push(Violation::EntryOverriddenByCategory { key });
                    }
                    value => entry.value = Value::from(value),
                },
                None => match value {
                    serde_json::Value::Object(map) => {
                        let mut category = Category::default();
                        category.merge(map, &key, violations);
                        self.children.insert(segment, Node::Category(category));
                    }
                    value => match Entry::infer(Value::from(value)) {
                        Some(entry) => {
                            warn!(key = %key, "unregistered config entry");
                            self.children.insert(segment, Node::Entry(entry));
                        }
                        None => violations.push(Violation::UnsupportedValue { key }),
                    },
                },
            }
        }
    }

    /// Validate every entry of the tree, collecting all violations.
    pub(crate) fn validate(&mut self, prefix: &str, violations: &mut Violations) {
        for (segment, node) in &mut self.children {
            let key = join(prefix, segment);
            match node {
                Node::Category(category) => category.validate(&key, violations),
                Node::Entry(entry) => {
                    if let Err(violation) = entry.validate(&key) {
                        violations.push(violation);
                    }
                }
            }
        }
    }

    /// Convert the tree to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.children
                .iter()
                .map(|(segment, node)| {
                    let value = match node {
                        Node::Category(category) => category.to_json(),
                        Node::Entry(entry) => entry.value.to_json(),
                    };
                    (segment.clone(), value)
                })
                .collect(),
        )
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), SchemaError> {
    if key.split('.').any(str::is_empty) {
        return Err(SchemaError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;
    use serde_json::json;

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn tree() -> Category {
        let mut root = Category::new();
        let (parent, leaf, _) = root.walk("server.proxy.port").unwrap();
        parent.insert(leaf, Entry::new(Kind::Int).with_value(80));
        let (parent, leaf, _) = root.walk("app.name").unwrap();
        parent.insert(leaf, Entry::new(Kind::String).with_value("goyave"));
        root
    }

    #[test]
    fn test_walk_rejects_invalid_keys() {
        let mut root = Category::new();
        for key in ["", "a.", ".a", "a..b"] {
            assert_eq!(
                root.walk(key).unwrap_err(),
                SchemaError::InvalidKey {
                    key: key.to_string()
                }
            );
        }
    }

    #[test]
    fn test_walk_creates_categories() {
        let mut root = Category::new();
        let (_, leaf, existed) = root.walk("a.b.c").unwrap();
        assert_eq!(leaf, "c");
        assert!(!existed);
        assert!(root.category("a.b").is_some());
        assert!(root.category("a.b").unwrap().is_empty());
    }

    #[test]
    fn test_walk_existing_entry() {
        let mut root = tree();
        let (parent, leaf, existed) = root.walk("server.proxy.port").unwrap();
        assert!(existed);
        assert!(matches!(parent.child(leaf), Some(Node::Entry(_))));
    }

    #[test]
    fn test_walk_through_entry() {
        let mut root = tree();
        assert_eq!(
            root.walk("app.name.first").unwrap_err(),
            SchemaError::EntryNotCategory {
                key: "app.name".to_string()
            }
        );
    }

    #[test]
    fn test_walk_onto_category() {
        let mut root = tree();
        assert_eq!(
            root.walk("server.proxy").unwrap_err(),
            SchemaError::CategoryNotEntry {
                key: "server.proxy".to_string()
            }
        );
    }

    #[test]
    fn test_lookup() {
        let root = tree();
        assert!(matches!(root.lookup("server"), Some(Node::Category(_))));
        assert_eq!(
            root.entry("server.proxy.port").map(|e| &e.value),
            Some(&Value::Int(80))
        );
        assert!(root.lookup("server.proxy.port.x").is_none());
        assert!(root.lookup("missing").is_none());
        assert!(root.entry("server").is_none());
    }

    #[test]
    fn test_merge_replaces_values() {
        let mut root = tree();
        let mut violations = Violations::default();
        root.merge(
            object(json!({"server": {"proxy": {"port": 8080.0}}})),
            "",
            &mut violations,
        );
        assert!(violations.is_empty());
        // Not validated yet.
        assert_eq!(
            root.entry("server.proxy.port").unwrap().value,
            Value::Float(8080.0)
        );
    }

    #[test]
    fn test_merge_conflicts_are_accumulated() {
        let mut root = tree();
        let mut violations = Violations::default();
        root.merge(
            object(json!({"server": {"proxy": 1}, "app": {"name": {"first": "x"}}})),
            "",
            &mut violations,
        );
        assert_eq!(
            violations.as_slice(),
            &[
                Violation::EntryOverriddenByCategory {
                    key: "app.name".to_string()
                },
                Violation::CategoryOverriddenByEntry {
                    key: "server.proxy".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_merge_unregistered_keys() {
        let mut root = tree();
        let mut violations = Violations::default();
        root.merge(
            object(json!({"custom": {"flag": true, "ids": [1, 2], "empty": {}}})),
            "",
            &mut violations,
        );
        assert!(violations.is_empty());

        let flag = root.entry("custom.flag").unwrap();
        assert_eq!(flag.kind, Kind::Bool);
        let ids = root.entry("custom.ids").unwrap();
        assert_eq!(ids.kind, Kind::Int);
        assert!(ids.is_slice);
        assert!(root.category("custom.empty").unwrap().is_empty());
    }

    #[test]
    fn test_merge_unsupported_value() {
        let mut root = Category::new();
        let mut violations = Violations::default();
        root.merge(object(json!({"x": [{"a": 1}]})), "", &mut violations);
        assert_eq!(
            violations.as_slice(),
            &[Violation::UnsupportedValue {
                key: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let mut root = tree();
        let mut violations = Violations::default();
        root.merge(
            object(json!({"server": {"proxy": {"port": 1.5}}, "app": {"name": 1}})),
            "",
            &mut violations,
        );
        root.validate("", &mut violations);
        let keys: Vec<_> = violations.as_slice().iter().map(Violation::key).collect();
        assert_eq!(keys, vec!["app.name", "server.proxy.port"]);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = tree();
        let mut copy = original.clone();
        copy.entry_mut("app.name").unwrap().value = "changed".into();
        assert_eq!(
            original.entry("app.name").unwrap().value,
            Value::from("goyave")
        );
    }

    #[test]
    fn test_to_json() {
        let root = tree();
        assert_eq!(
            root.to_json(),
            json!({"app": {"name": "goyave"}, "server": {"proxy": {"port": 80}}})
        );
    }
}
