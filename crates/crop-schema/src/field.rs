//! Resolved field schemas

use crop_tree::{ConfigPath, ConfigTree};
use serde_json::Value;

/// Table holding file references; inline fields pointing at it carry crops
pub const FILE_REFERENCE_TABLE: &str = "sys_file_reference";

/// Kind of a field, derived from its `config.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A file reference field whose references carry crop data
    FileCrop,
    /// A flexible-form container with a record-specific sub-structure
    Composite,
    Other,
}

impl FieldKind {
    /// Derive the kind from a column definition (`{config: {type: ...}}`)
    pub fn of(definition: &ConfigTree) -> Self {
        match definition.get_str("config.type") {
            Some("file") => FieldKind::FileCrop,
            Some("inline")
                if definition.get_str("config.foreign_table") == Some(FILE_REFERENCE_TABLE) =>
            {
                FieldKind::FileCrop
            }
            Some("flex") => FieldKind::Composite,
            _ => FieldKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::FileCrop => "file-crop",
            FieldKind::Composite => "composite",
            FieldKind::Other => "other",
        }
    }
}

/// Where a resolved schema came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOrigin {
    /// A column of the table, resolved through the full cascade
    Column,
    /// An element inside a flexible-form structure
    CompositeElement { container: String, sheet: String },
}

/// The effective configuration of one field.
///
/// Computed fresh for every request; page overrides depend on the page the
/// record lives on.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub table: String,
    pub field: String,
    pub kind: FieldKind,
    pub origin: FieldOrigin,
    definition: ConfigTree,
}

impl FieldSchema {
    pub fn new(
        table: impl Into<String>,
        field: impl Into<String>,
        definition: ConfigTree,
        origin: FieldOrigin,
    ) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            kind: FieldKind::of(&definition),
            origin,
            definition,
        }
    }

    /// The full definition including `label`, `config`, ...
    pub fn definition(&self) -> &ConfigTree {
        &self.definition
    }

    pub fn into_definition(self) -> ConfigTree {
        self.definition
    }

    /// The `config` section, empty if the definition has none
    pub fn config(&self) -> ConfigTree {
        self.definition.subtree_or_empty("config")
    }

    pub fn config_type(&self) -> Option<&str> {
        self.definition.get_str("config.type")
    }

    pub fn get<P: Into<ConfigPath>>(&self, path: P) -> Option<&Value> {
        self.definition.get(path)
    }

    /// Subtree of the definition at `path`, empty when absent
    pub fn subtree_or_empty<P: Into<ConfigPath>>(&self, path: P) -> ConfigTree {
        self.definition.subtree_or_empty(path)
    }
}
