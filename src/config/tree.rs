//! Configuration tree.
//!
//! Every value is tagged as a [`ConfigValue::Leaf`] or a [`ConfigValue::Node`]
//! when it enters the tree, so merging never has to guess whether a JSON value
//! is "a plain object". Arrays are leaves. JSON `null` means "not specified"
//! and is dropped on ingestion.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single entry in a [`ConfigTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Scalar or array, replaced as a whole when overridden.
    Leaf(Value),
    /// Nested mapping, merged key by key.
    Node(ConfigTree),
}

impl ConfigValue {
    /// Tag a JSON value. Returns `None` for `null`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Object(map) => Some(ConfigValue::Node(ConfigTree::from_map(map))),
            other => Some(ConfigValue::Leaf(other)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Leaf(value) => value.clone(),
            ConfigValue::Node(tree) => tree.to_json(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            ConfigValue::Leaf(value) => Some(value),
            ConfigValue::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Node(tree) => Some(tree),
            ConfigValue::Leaf(_) => None,
        }
    }
}

/// Nested string-keyed configuration mapping.
///
/// Keys are kept sorted, so two equal trees always serialize to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree(BTreeMap<String, ConfigValue>);

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a JSON value. Only objects qualify as a tree root.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from_map(map)),
            _ => None,
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        Self(
            map.into_iter()
                .filter_map(|(key, value)| ConfigValue::from_json(value).map(|v| (key, v)))
                .collect(),
        )
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.0.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }

    /// Look up a value by dot-separated path (`"server.url"`).
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_node()?.get(segment)?;
        }
        Some(current)
    }

    /// Shorthand for the leaf value at `path`.
    pub fn get_leaf(&self, path: &str) -> Option<&Value> {
        self.get_path(path).and_then(ConfigValue::as_leaf)
    }

    /// Set the value at a dot-separated path, creating intermediate nodes.
    ///
    /// A leaf sitting where an intermediate node is needed is replaced.
    /// Setting `null` is a no-op.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let Some(value) = ConfigValue::from_json(value) else {
            return;
        };
        let segments: Vec<&str> = path.split('.').collect();
        self.set_segments(&segments, value);
    }

    fn set_segments(&mut self, segments: &[&str], value: ConfigValue) {
        match segments {
            [] => {}
            [last] => {
                self.0.insert((*last).to_string(), value);
            }
            [first, rest @ ..] => {
                let slot = self
                    .0
                    .entry((*first).to_string())
                    .or_insert_with(|| ConfigValue::Node(ConfigTree::new()));
                if let ConfigValue::Leaf(_) = *slot {
                    *slot = ConfigValue::Node(ConfigTree::new());
                }
                if let ConfigValue::Node(tree) = slot {
                    tree.set_segments(rest, value);
                }
            }
        }
    }

    /// True when at least one leaf sits somewhere below this tree.
    pub fn has_leaves(&self) -> bool {
        self.0.values().any(|value| match value {
            ConfigValue::Leaf(_) => true,
            ConfigValue::Node(tree) => tree.has_leaves(),
        })
    }

    /// Dot paths of every leaf in the tree, in sorted order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths("", &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (key, value) in &self.0 {
            let path = join_path(prefix, key);
            match value {
                ConfigValue::Leaf(_) => out.push(path),
                ConfigValue::Node(tree) => tree.collect_leaf_paths(&path, out),
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ConfigTree::from_json(value).ok_or_else(|| {
            serde::de::Error::custom("expected a mapping at the configuration root")
        })
    }
}

impl<K: Into<String>> FromIterator<(K, ConfigValue)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (K, ConfigValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Join a dot-path prefix and a key.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
