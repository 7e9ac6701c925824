//! Keys that page overrides may introduce on a field's `config`
//!
//! A page override always replaces keys the field already declares. Keys the
//! field does not declare yet are only accepted when listed here for the
//! field's `config.type`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-config-type list of keys a page override may add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideAllowList {
    by_type: HashMap<String, Vec<String>>,
}

impl OverrideAllowList {
    /// An allow list that admits nothing beyond already-declared keys
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    /// Allow `keys` for fields of `config_type`, replacing earlier entries
    pub fn with_type<I, S>(mut self, config_type: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_type
            .insert(config_type.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Whether `key` may be added to a field whose `config.type` is `config_type`
    pub fn allows(&self, config_type: Option<&str>, key: &str) -> bool {
        config_type
            .and_then(|config_type| self.by_type.get(config_type))
            .is_some_and(|keys| keys.iter().any(|allowed| allowed == key))
    }

    /// Add the keys of `other` to the keys already allowed per config type
    pub fn extend(&mut self, other: OverrideAllowList) {
        for (config_type, keys) in other.by_type {
            let allowed = self.by_type.entry(config_type).or_default();
            for key in keys {
                if !allowed.contains(&key) {
                    allowed.push(key);
                }
            }
        }
    }
}

impl Default for OverrideAllowList {
    fn default() -> Self {
        Self::empty()
            .with_type("input", ["size", "max", "readOnly"])
            .with_type("number", ["size", "readOnly"])
            .with_type("email", ["size", "readOnly"])
            .with_type("link", ["size", "readOnly"])
            .with_type("password", ["size", "readOnly"])
            .with_type("datetime", ["size", "readOnly"])
            .with_type("color", ["size", "readOnly"])
            .with_type("uuid", ["size", "enableCopyToClipboard"])
            .with_type("text", ["cols", "rows", "wrap", "max", "readOnly"])
            .with_type("json", ["cols", "rows", "readOnly"])
            .with_type("check", ["cols", "readOnly"])
            .with_type("select", [
                "size",
                "autoSizeMax",
                "maxitems",
                "minitems",
                "readOnly",
                "treeConfig",
                "fileFolderConfig",
            ])
            .with_type("category", ["size", "maxitems", "minitems", "readOnly", "treeConfig"])
            .with_type("group", [
                "size",
                "autoSizeMax",
                "maxitems",
                "minitems",
                "readOnly",
                "elementBrowserEntryPoints",
            ])
            .with_type("folder", ["size", "autoSizeMax", "maxitems", "minitems", "readOnly"])
            .with_type("inline", [
                "appearance",
                "behaviour",
                "foreign_label",
                "foreign_selector",
                "foreign_unique",
                "maxitems",
                "minitems",
                "size",
                "autoSizeMax",
                "symmetric_label",
                "readOnly",
                "overrideChildTca",
            ])
            .with_type("file", [
                "appearance",
                "behaviour",
                "maxitems",
                "minitems",
                "readOnly",
                "overrideChildTca",
            ])
            .with_type("imageManipulation", ["ratios", "cropVariants"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_crop_overrides_on_file_fields() {
        let allow = OverrideAllowList::default();
        assert!(allow.allows(Some("file"), "overrideChildTca"));
        assert!(allow.allows(Some("imageManipulation"), "cropVariants"));
        assert!(!allow.allows(Some("file"), "foreign_table"));
        assert!(!allow.allows(None, "overrideChildTca"));
    }

    #[test]
    fn test_extend_adds_keys_per_type() {
        let mut allow = OverrideAllowList::default();
        allow.extend(
            OverrideAllowList::empty()
                .with_type("file", ["maxitems", "fileFolderConfig"])
                .with_type("custom", ["size"]),
        );
        assert!(allow.allows(Some("file"), "fileFolderConfig"));
        assert!(allow.allows(Some("file"), "overrideChildTca"));
        assert!(allow.allows(Some("inline"), "overrideChildTca"));
        assert!(allow.allows(Some("custom"), "size"));
    }

    #[test]
    fn test_extend_skips_known_keys() {
        let mut allow = OverrideAllowList::empty().with_type("file", ["maxitems"]);
        allow.extend(OverrideAllowList::empty().with_type("file", ["maxitems", "minitems"]));
        assert_eq!(
            allow,
            OverrideAllowList::empty().with_type("file", ["maxitems", "minitems"])
        );
    }

    #[test]
    fn test_deserializes_from_map() {
        let allow: OverrideAllowList =
            serde_json::from_str(r#"{"file": ["overrideChildTca"]}"#).unwrap();
        assert!(allow.allows(Some("file"), "overrideChildTca"));
        assert!(!allow.allows(Some("inline"), "overrideChildTca"));
    }
}
