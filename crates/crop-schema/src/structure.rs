//! Flexible-form sub-structures
//!
//! A composite (`flex`) column does not have a fixed schema. Its structure is
//! picked per record: `config.ds` holds candidate structures keyed by a data
//! structure key, and `config.ds_pointerField` names up to two record columns
//! whose values select the key.
//!
//! A parsed structure is a tree of sheets, each with a `ROOT.el` map of
//! element definitions:
//!
//! ```text
//! sheets:
//!   sDEF:
//!     ROOT:
//!       el:
//!         <element>: { label, config: { type, ... } }
//! ```

use std::fmt;
use std::sync::Arc;

use crop_tree::ConfigTree;
use serde_json::{Map, Value};

use crate::records::Record;
use crate::registry::SchemaRegistry;

/// Key used when no pointer field selects a structure
pub const DEFAULT_STRUCTURE_KEY: &str = "default";

/// Sheet name used when a structure declares `ROOT` without sheets
pub const DEFAULT_SHEET: &str = "sDEF";

/// Identifies one concrete structure of a composite column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructureIdentifier {
    pub table: String,
    pub field: String,
    pub data_structure_key: String,
}

impl StructureIdentifier {
    /// Derive the identifier for `table.field` from the column definition and
    /// the owning record.
    ///
    /// Without `ds_pointerField` the `default` structure is used. With one
    /// pointer field its value selects the key, falling back to `default`.
    /// With two pointer fields the candidates are tried in the order
    /// `first,second`, `first,*`, `*,second`, `first`, `default`.
    ///
    /// Returns `None` when no candidate is declared or a pointer field is
    /// missing from the record.
    pub fn for_column(
        table: &str,
        field: &str,
        definition: &ConfigTree,
        record: &Record,
    ) -> Option<Self> {
        let structures = definition.get_map("config.ds");
        let declares = |key: &str| structures.is_some_and(|ds| ds.contains_key(key));

        let key = match definition.get_str("config.ds_pointerField") {
            None => declares(DEFAULT_STRUCTURE_KEY).then(|| DEFAULT_STRUCTURE_KEY.to_string()),
            Some(pointer_fields) => {
                let mut pointers = pointer_fields.split(',').map(str::trim);
                let first_field = pointers.next().unwrap_or_default();
                let first = column_string(record.get(first_field)?);

                let mut candidates = Vec::new();
                if let Some(second_field) = pointers.next() {
                    let second = record.get(second_field).map(column_string).unwrap_or_default();
                    candidates.push(format!("{},{}", first, second));
                    candidates.push(format!("{},*", first));
                    candidates.push(format!("*,{}", second));
                }
                candidates.push(first);
                candidates.push(DEFAULT_STRUCTURE_KEY.to_string());

                candidates
                    .into_iter()
                    .find(|candidate| declares(candidate.as_str()))
            }
        };

        let Some(data_structure_key) = key else {
            tracing::debug!(table, field, "No data structure declared for record");
            return None;
        };

        Some(Self {
            table: table.to_string(),
            field: field.to_string(),
            data_structure_key,
        })
    }
}

impl fmt::Display for StructureIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.table, self.field, self.data_structure_key)
    }
}

/// Supplies parsed structures for composite columns
pub trait StructureSource: Send + Sync {
    /// The parsed structure, normalized to have a `sheets` map
    fn structure(&self, identifier: &StructureIdentifier) -> Option<ConfigTree>;
}

/// Reads structures straight from the schema registry's `config.ds` entries.
///
/// Entries must already be materialized trees; raw structure text is not
/// parsed here and such entries are treated as absent.
#[derive(Debug, Clone)]
pub struct TcaStructureSource {
    registry: Arc<SchemaRegistry>,
}

impl TcaStructureSource {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }
}

impl StructureSource for TcaStructureSource {
    fn structure(&self, identifier: &StructureIdentifier) -> Option<ConfigTree> {
        let definition = self
            .registry
            .table(&identifier.table)?
            .column(&identifier.field)?;

        match definition.get(["config", "ds", identifier.data_structure_key.as_str()])? {
            Value::Object(structure) => Some(normalize_sheets(structure.clone())),
            _ => {
                tracing::debug!(%identifier, "Data structure is not materialized, skipping");
                None
            }
        }
    }
}

/// Ensure a structure has a `sheets` map.
///
/// A structure declaring `ROOT` at the top becomes a single `sDEF` sheet.
pub fn normalize_sheets(mut structure: Map<String, Value>) -> ConfigTree {
    if !structure.contains_key("sheets") {
        if let Some(root) = structure.shift_remove("ROOT") {
            let mut sheet = Map::new();
            sheet.insert("ROOT".to_string(), root);
            let mut sheets = Map::new();
            sheets.insert(DEFAULT_SHEET.to_string(), Value::Object(sheet));
            structure.insert("sheets".to_string(), Value::Object(sheets));
        }
    }
    ConfigTree::from(structure)
}

/// Column value as used in structure keys
fn column_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn column(config: Value) -> ConfigTree {
        ConfigTree::from_json(json!({"config": config})).unwrap()
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn key_for(config: Value, row: Value) -> Option<String> {
        StructureIdentifier::for_column("tt_content", "pi_flexform", &column(config), &record(row))
            .map(|id| id.data_structure_key)
    }

    #[test]
    fn test_default_key_without_pointer() {
        assert_eq!(
            key_for(json!({"type": "flex", "ds": {"default": {}}}), json!({})),
            Some("default".to_string())
        );
        assert_eq!(key_for(json!({"type": "flex", "ds": {"other": {}}}), json!({})), None);
    }

    #[rstest]
    #[case(json!({"list_type": "news", "CType": "list"}), Some("news,list"))]
    #[case(json!({"list_type": "news", "CType": "text"}), Some("news,*"))]
    #[case(json!({"list_type": "", "CType": "gallery"}), Some("*,gallery"))]
    #[case(json!({"list_type": "blog", "CType": "x"}), Some("blog"))]
    #[case(json!({"list_type": "other", "CType": "x"}), Some("default"))]
    #[case(json!({"CType": "gallery"}), None)]
    fn test_two_pointer_fields(#[case] row: Value, #[case] expected: Option<&str>) {
        let config = json!({
            "type": "flex",
            "ds_pointerField": "list_type, CType",
            "ds": {
                "news,list": {}, "news,*": {}, "*,gallery": {}, "blog": {}, "default": {}
            }
        });
        assert_eq!(key_for(config, row), expected.map(str::to_string));
    }

    #[test]
    fn test_single_pointer_field_falls_back_to_default() {
        let config = json!({"type": "flex", "ds_pointerField": "CType", "ds": {"gallery": {}, "default": {}}});
        assert_eq!(key_for(config.clone(), json!({"CType": "gallery"})), Some("gallery".to_string()));
        assert_eq!(key_for(config, json!({"CType": "text"})), Some("default".to_string()));
    }

    #[test]
    fn test_normalize_root_without_sheets() {
        let structure = json!({"ROOT": {"el": {"image": {}}}}).as_object().cloned().unwrap();
        let normalized = normalize_sheets(structure);
        assert!(normalized.get("sheets.sDEF.ROOT.el.image").is_some());
        assert!(!normalized.contains_key("ROOT"));
    }

    #[test]
    fn test_tca_source_reads_materialized_structures_only() {
        let registry = SchemaRegistry::from_json(json!({"tt_content": {"columns": {"pi_flexform": {
            "config": {"type": "flex", "ds": {
                "default": {"sheets": {"sDEF": {"ROOT": {"el": {}}}}},
                "raw": "<T3DataStructure />"
            }}
        }}}}))
        .unwrap();
        let source = TcaStructureSource::new(Arc::new(registry));
        let id = |key: &str| StructureIdentifier {
            table: "tt_content".to_string(),
            field: "pi_flexform".to_string(),
            data_structure_key: key.to_string(),
        };

        assert!(source.structure(&id("default")).is_some());
        assert!(source.structure(&id("raw")).is_none());
        assert!(source.structure(&id("missing")).is_none());
        assert_eq!(id("default").to_string(), "tt_content.pi_flexform[default]");
    }
}
