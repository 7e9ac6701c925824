//! Immutable snapshot of table schemas
//!
//! Each table is a tree shaped like
//!
//! ```text
//! ctrl:      { type: "<discriminator column>" }
//! columns:   { <field>: { label, config: { type, ... } } }
//! types:     { <subtype>: { showitem, columnsOverrides: { <field>: {...} } } }
//! palettes:  { <name>: { showitem } }
//! ```
//!
//! The snapshot is loaded once and shared read-only; a reload builds a new
//! registry instead of mutating the existing one.

use crop_tree::{ConfigTree, is_truthy};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::records::Record;

/// Schema of a single table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    name: String,
    tree: ConfigTree,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, tree: ConfigTree) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Base definition of a column (`columns.<field>`).
    ///
    /// Absent and empty definitions both yield `None`.
    pub fn column(&self, field: &str) -> Option<ConfigTree> {
        self.tree
            .subtree(["columns", field])
            .filter(|definition| !definition.is_empty())
    }

    pub fn has_column(&self, field: &str) -> bool {
        self.tree.get_map(["columns", field]).is_some()
    }

    /// Name of the column that selects the record subtype (`ctrl.type`)
    pub fn type_field(&self) -> Option<&str> {
        self.tree
            .get(["ctrl", "type"])
            .filter(|value| is_truthy(value))
            .and_then(Value::as_str)
    }

    /// Subtype definition (`types.<subtype>`)
    pub fn subtype(&self, subtype: &str) -> Option<ConfigTree> {
        self.tree.subtree(["types", subtype])
    }

    /// First declared subtype, used when the table has no discriminator
    pub fn first_subtype(&self) -> Option<&str> {
        self.tree.get_map("types")?.keys().next().map(String::as_str)
    }

    /// Field override for a subtype (`types.<subtype>.columnsOverrides.<field>`)
    pub fn columns_override(&self, subtype: &str, field: &str) -> Option<ConfigTree> {
        self.tree
            .subtree(["types", subtype, "columnsOverrides", field])
            .filter(|definition| !definition.is_empty())
    }

    /// Layout descriptor of a subtype (`types.<subtype>.showitem`)
    pub fn showitem(&self, subtype: &str) -> Option<&str> {
        self.tree.get_str(["types", subtype, "showitem"])
    }

    /// Layout descriptor of a palette (`palettes.<name>.showitem`)
    pub fn palette_showitem(&self, palette: &str) -> Option<&str> {
        self.tree.get_str(["palettes", palette, "showitem"])
    }

    /// Determine the subtype of a record of this table.
    ///
    /// Without a discriminator column the first declared subtype is used.
    /// A record lacking the discriminator column, or holding an empty / zero
    /// value there, has the empty subtype.
    pub fn record_type(&self, record: &Record) -> String {
        let Some(type_field) = self.type_field() else {
            return self.first_subtype().unwrap_or_default().to_string();
        };

        if type_field.contains(':') {
            // Subtype stored on a related record; not resolvable from one row
            tracing::debug!(
                table = %self.name,
                type_field,
                "Foreign type discriminator is not supported, using empty subtype"
            );
            return String::new();
        }

        match record.get(type_field) {
            Some(value) if is_truthy(value) => match value {
                Value::String(text) => text.clone(),
                Value::Bool(_) => "1".to_string(),
                other => other.to_string(),
            },
            _ => String::new(),
        }
    }
}

/// Process-wide, read-only registry of table schemas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a tree keyed by table name.
    ///
    /// Entries that are not maps are rejected.
    pub fn from_tree(tree: ConfigTree) -> Result<Self> {
        let mut tables = IndexMap::new();
        for (name, value) in tree.into_map() {
            let Some(table) = ConfigTree::from_json(value) else {
                return Err(Error::InvalidRegistry {
                    message: format!("table '{}' is not a map", name),
                });
            };
            tables.insert(name.clone(), TableSchema::new(name, table));
        }
        Ok(Self { tables })
    }

    /// Build a registry from a JSON value keyed by table name
    pub fn from_json(value: Value) -> Result<Self> {
        let tree = ConfigTree::from_json(value).ok_or_else(|| Error::InvalidRegistry {
            message: "registry root must be a map of tables".to_string(),
        })?;
        Self::from_tree(tree)
    }

    /// Return a registry with `table` added or replaced
    pub fn with_table(mut self, name: impl Into<String>, tree: ConfigTree) -> Self {
        let name = name.into();
        self.tables
            .insert(name.clone(), TableSchema::new(name, tree));
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Subtype of `record` in `table`; empty when the table is unknown
    pub fn record_type(&self, table: &str, record: &Record) -> String {
        self.table(table)
            .map(|schema| schema.record_type(record))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn table(value: Value) -> TableSchema {
        TableSchema::new("tt_content", ConfigTree::from_json(value).unwrap())
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_json_rejects_non_map_tables() {
        let err = SchemaRegistry::from_json(json!({"tt_content": "oops"})).unwrap_err();
        assert!(err.to_string().contains("tt_content"));
        assert!(SchemaRegistry::from_json(json!([1])).is_err());
    }

    #[test]
    fn test_column_lookup() {
        let schema = table(json!({"columns": {"image": {"config": {"type": "file"}}, "empty": {}}}));
        assert!(schema.column("image").is_some());
        assert!(schema.column("empty").is_none());
        assert!(schema.has_column("empty"));
        assert!(schema.column("missing").is_none());
    }

    #[rstest]
    #[case(json!({"CType": "textmedia"}), "textmedia")]
    #[case(json!({"CType": ""}), "")]
    #[case(json!({"CType": "0"}), "")]
    #[case(json!({"CType": 4}), "4")]
    #[case(json!({"CType": 0}), "")]
    #[case(json!({"CType": null}), "")]
    #[case(json!({"header": "no type column"}), "")]
    fn test_record_type_with_discriminator(#[case] row: Value, #[case] expected: &str) {
        let schema = table(json!({
            "ctrl": {"type": "CType"},
            "types": {"textmedia": {}, "4": {}}
        }));
        assert_eq!(schema.record_type(&record(row)), expected);
    }

    #[test]
    fn test_record_type_without_discriminator_uses_first_type() {
        let schema = table(json!({"ctrl": {"title": "x"}, "types": {"1": {}, "2": {}}}));
        assert_eq!(schema.record_type(&record(json!({}))), "1");

        let schema = table(json!({"ctrl": {"type": ""}}));
        assert_eq!(schema.record_type(&record(json!({}))), "");
    }

    #[test]
    fn test_record_type_with_foreign_discriminator() {
        let schema = table(json!({"ctrl": {"type": "uid_local:type"}}));
        assert_eq!(schema.record_type(&record(json!({"uid_local": 3}))), "");
    }

    #[test]
    fn test_registry_record_type_for_unknown_table() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.record_type("tt_content", &record(json!({"CType": "x"}))), "");
    }

    #[test]
    fn test_with_table_replaces() {
        let registry = SchemaRegistry::new()
            .with_table("pages", ConfigTree::new())
            .with_table("pages", ConfigTree::from_json(json!({"ctrl": {}})).unwrap());
        assert_eq!(registry.table_names().collect::<Vec<_>>(), vec!["pages"]);
        assert!(registry.table("pages").unwrap().tree().contains_key("ctrl"));
    }
}
