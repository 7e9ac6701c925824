//! Page-scoped configuration overrides
//!
//! Every page may carry a configuration tree. Field overrides live under
//!
//! ```text
//! TCEFORM.<table>.<field>.config                    generic override
//! TCEFORM.<table>.<field>.types.<subtype>.config    subtype-specific override
//! ```
//!
//! Parsing the configuration text is the caller's job; sources hand out
//! already-materialized trees.

use std::collections::HashMap;

use crop_tree::ConfigTree;
use serde_json::Value;

use crate::error::{Error, Result};

/// Root key of field overrides in a page configuration tree
pub const FIELD_OVERRIDES_KEY: &str = "TCEFORM";

/// Supplies the configuration tree in effect for a page
pub trait PageConfigSource: Send + Sync {
    /// Configuration of `page_id`, or `None` if the page has none
    fn page_config(&self, page_id: u64) -> Option<ConfigTree>;

    /// Generic override for `table.field` on `page_id`
    fn field_override(&self, page_id: u64, table: &str, field: &str) -> Option<ConfigTree> {
        self.page_config(page_id)?
            .subtree([FIELD_OVERRIDES_KEY, table, field, "config"])
    }

    /// Subtype-specific override for `table.field` on `page_id`
    fn subtype_field_override(
        &self,
        page_id: u64,
        table: &str,
        field: &str,
        subtype: &str,
    ) -> Option<ConfigTree> {
        if subtype.is_empty() {
            return None;
        }
        self.page_config(page_id)?
            .subtree([FIELD_OVERRIDES_KEY, table, field, "types", subtype, "config"])
    }
}

/// In-memory page configuration keyed by page id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageConfigRegistry {
    pages: HashMap<u64, ConfigTree>,
}

impl PageConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON map whose keys are page ids
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(Error::InvalidPageConfig {
                page_id: "*".to_string(),
                message: "page configuration root must be a map".to_string(),
            });
        };

        let mut registry = Self::new();
        for (key, value) in entries {
            let page_id = key.parse::<u64>().map_err(|_| Error::InvalidPageConfig {
                page_id: key.clone(),
                message: "page id must be an unsigned integer".to_string(),
            })?;
            let tree = ConfigTree::from_json(value).ok_or_else(|| Error::InvalidPageConfig {
                page_id: key.clone(),
                message: "configuration must be a map".to_string(),
            })?;
            registry.insert(page_id, tree);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, page_id: u64, config: ConfigTree) {
        self.pages.insert(page_id, config);
    }

    pub fn with_page(mut self, page_id: u64, config: ConfigTree) -> Self {
        self.insert(page_id, config);
        self
    }
}

impl PageConfigSource for PageConfigRegistry {
    fn page_config(&self, page_id: u64) -> Option<ConfigTree> {
        self.pages.get(&page_id).cloned()
    }
}
