//! The [`ConfigTree`] type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::merge::{deep_merge, override_known};
use crate::path::{ConfigPath, get_at_path, set_at_path};

/// An ordered mapping from string keys to scalars or nested trees.
///
/// Lookups never fail: an absent path is reported as `None`, which callers
/// treat as "this layer contributes nothing". Insertion order is preserved,
/// so declaration order of crop variants and ratios survives merging.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(Map<String, Value>);

impl ConfigTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Returns `None` if the value is not a map.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Wrap a JSON value, treating anything that is not a map as empty.
    pub fn from_json_lossy(value: Value) -> Self {
        Self::from_json(value).unwrap_or_default()
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Top-level keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterate over top-level entries whose value is itself a tree
    pub fn subtrees(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_object().map(|map| (key.as_str(), map)))
    }

    /// Look up the value at `path`
    pub fn get<P: Into<ConfigPath>>(&self, path: P) -> Option<&Value> {
        let path = path.into();
        let (first, rest) = path.segments().split_first()?;
        get_at_path(self.0.get(first)?, rest)
    }

    /// Look up the map at `path`
    pub fn get_map<P: Into<ConfigPath>>(&self, path: P) -> Option<&Map<String, Value>> {
        self.get(path)?.as_object()
    }

    /// Clone the subtree at `path`. Scalars and absent paths yield `None`.
    pub fn subtree<P: Into<ConfigPath>>(&self, path: P) -> Option<ConfigTree> {
        self.get_map(path).cloned().map(Self)
    }

    /// Clone the subtree at `path`, or an empty tree if there is none
    pub fn subtree_or_empty<P: Into<ConfigPath>>(&self, path: P) -> ConfigTree {
        self.subtree(path).unwrap_or_default()
    }

    /// Look up a string at `path`
    pub fn get_str<P: Into<ConfigPath>>(&self, path: P) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Loose truthiness of the value at `path`; absent is false
    pub fn is_truthy<P: Into<ConfigPath>>(&self, path: P) -> bool {
        self.get(path).is_some_and(is_truthy)
    }

    /// Set the value at `path`, creating intermediate maps.
    ///
    /// Returns `false` if an intermediate node is a scalar.
    pub fn set<P: Into<ConfigPath>>(&mut self, path: P, value: Value) -> bool {
        let path = path.into();
        let Some((first, rest)) = path.segments().split_first() else {
            return false;
        };

        if rest.is_empty() {
            self.0.insert(first.clone(), value);
            return true;
        }

        let child = self
            .0
            .entry(first.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        set_at_path(child, rest, value)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Deep merge `overlay` into this tree (see [`deep_merge`])
    pub fn deep_merge(&mut self, overlay: &ConfigTree) {
        for (key, overlay_value) in &overlay.0 {
            match self.0.get_mut(key) {
                Some(base_value) => deep_merge(base_value, overlay_value),
                None => {
                    self.0.insert(key.clone(), overlay_value.clone());
                }
            }
        }
    }

    /// Consuming variant of [`ConfigTree::deep_merge`]
    pub fn merged(mut self, overlay: &ConfigTree) -> Self {
        self.deep_merge(overlay);
        self
    }

    /// Shallow known-key override (see [`override_known`]).
    ///
    /// Returns the overlay keys that were ignored.
    pub fn override_known<F>(&mut self, overlay: &ConfigTree, is_known: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        override_known(&mut self.0, &overlay.0, is_known)
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ConfigTree> for Value {
    fn from(tree: ConfigTree) -> Self {
        tree.into_json()
    }
}

/// Loose truthiness as used by configuration flags such as `disabled`.
///
/// `null`, `false`, `0`, `0.0`, `""`, `"0"`, empty arrays and empty maps are
/// false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
