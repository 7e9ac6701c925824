//! Path parsing and traversal utilities
//!
//! Paths address nodes inside nested configuration maps.
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `config.overrideChildTca.columns`
//! - Explicit segments for keys that contain dots themselves:
//!   `ConfigPath::from(["allowedAspectRatios", "1.91:1"])`
//!
//! # Examples
//!
//! ```
//! use crop_tree::path::{ConfigPath, get_at_path};
//! use serde_json::json;
//!
//! let path = ConfigPath::parse("config.cropVariants.default");
//! assert_eq!(path.segments(), ["config", "cropVariants", "default"]);
//!
//! let value = json!({"config": {"cropVariants": {"default": {"title": "Default"}}}});
//! assert_eq!(
//!     get_at_path(&value, path.segments()).and_then(|v| v.get("title")),
//!     Some(&json!("Default"))
//! );
//! ```

use std::fmt;

use serde_json::{Map, Value};

/// A parsed path into a configuration tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// Parse a dot-separated path.
    ///
    /// Empty segments (leading, trailing or doubled dots) are skipped, so
    /// `".config..type."` is the same path as `"config.type"`.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from explicit segments, keeping them verbatim
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The root path (no segments)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a single segment, returning the extended path
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append all segments of `other`, returning the extended path
    pub fn join(mut self, other: &ConfigPath) -> Self {
        self.segments.extend(other.segments.iter().cloned());
        self
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for ConfigPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<&String> for ConfigPath {
    fn from(path: &String) -> Self {
        Self::parse(path)
    }
}

impl From<&ConfigPath> for ConfigPath {
    fn from(path: &ConfigPath) -> Self {
        path.clone()
    }
}

impl<const N: usize> From<[&str; N]> for ConfigPath {
    fn from(segments: [&str; N]) -> Self {
        Self::from_segments(segments)
    }
}

impl From<&[&str]> for ConfigPath {
    fn from(segments: &[&str]) -> Self {
        Self::from_segments(segments.iter().copied())
    }
}

/// Get a reference to the value at the given path.
///
/// Returns `None` if any segment is missing or addresses into a scalar.
///
/// # Examples
///
/// ```
/// use crop_tree::path::{ConfigPath, get_at_path};
/// use serde_json::json;
///
/// let value = json!({"config": {"type": "file"}});
/// let path = ConfigPath::parse("config.type");
/// assert_eq!(get_at_path(&value, path.segments()), Some(&json!("file")));
///
/// let path = ConfigPath::parse("config.type.nested");
/// assert_eq!(get_at_path(&value, path.segments()), None);
/// ```
pub fn get_at_path<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    get_at_path(value.as_object()?.get(first)?, rest)
}

/// Get a mutable reference to the value at the given path
pub fn get_at_path_mut<'a>(value: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    get_at_path_mut(value.as_object_mut()?.get_mut(first)?, rest)
}

/// Set a value at the given path.
///
/// Missing intermediate maps are created. Returns `false` when an existing
/// intermediate node is a scalar, in which case nothing is changed.
///
/// # Examples
///
/// ```
/// use crop_tree::path::{ConfigPath, set_at_path, get_at_path};
/// use serde_json::json;
///
/// let mut value = json!({});
/// let path = ConfigPath::parse("config.cropVariants.default.title");
/// assert!(set_at_path(&mut value, path.segments(), json!("Default")));
/// assert_eq!(get_at_path(&value, path.segments()), Some(&json!("Default")));
/// ```
pub fn set_at_path(value: &mut Value, segments: &[String], new_value: Value) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        *value = new_value;
        return true;
    };

    let Value::Object(map) = value else {
        return false;
    };

    if rest.is_empty() {
        map.insert(first.clone(), new_value);
        return true;
    }

    let child = map
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    set_at_path(child, rest, new_value)
}

/// Remove the value at the given path, returning it if it existed.
///
/// Sibling order is preserved.
pub fn remove_at_path(value: &mut Value, segments: &[String]) -> Option<Value> {
    let (last, parents) = segments.split_last()?;
    let parent = get_at_path_mut(value, parents)?;
    parent.as_object_mut()?.shift_remove(last)
}
