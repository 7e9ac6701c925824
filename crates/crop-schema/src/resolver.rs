//! Schema resolution with layered overrides
//!
//! The `SchemaResolver` computes the effective definition of a column by
//! stacking the registry definition, the subtype override and the page
//! overrides, with later layers overriding earlier ones.

use std::sync::Arc;

use crop_tree::ConfigTree;
use serde_json::Value;

use crate::field::{FieldOrigin, FieldSchema};
use crate::overrides::OverrideAllowList;
use crate::page_config::PageConfigSource;
use crate::registry::{SchemaRegistry, TableSchema};

/// Resolves the effective schema of a column.
///
/// Layers, lowest to highest priority:
/// 1. `columns.<field>` of the table
/// 2. `types.<subtype>.columnsOverrides.<field>`, deep merged, only when the
///    subtype is non-empty and the override declares a `config` section
/// 3. Page overrides onto `config`: generic first, then subtype-specific.
///    Each replaces keys the config already has (or the allow list admits)
///    and ignores all others.
///
/// Missing layers contribute nothing. Nothing is cached: page overrides
/// depend on the request's page.
#[derive(Clone)]
pub struct SchemaResolver {
    registry: Arc<SchemaRegistry>,
    pages: Arc<dyn PageConfigSource>,
    allow_list: OverrideAllowList,
}

impl SchemaResolver {
    /// Create a resolver with the default override allow list
    pub fn new(registry: Arc<SchemaRegistry>, pages: Arc<dyn PageConfigSource>) -> Self {
        Self {
            registry,
            pages,
            allow_list: OverrideAllowList::default(),
        }
    }

    /// Replace the override allow list
    pub fn with_allow_list(mut self, allow_list: OverrideAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolve the effective schema of `table.field`.
    ///
    /// Returns `None` when the table or the column is not declared; callers
    /// treat that as "nothing to synchronize".
    pub fn resolve(
        &self,
        table: &str,
        field: &str,
        page_id: u64,
        subtype: &str,
    ) -> Option<FieldSchema> {
        let Some(table_schema) = self.registry.table(table) else {
            tracing::debug!(table, "Table not declared in schema registry");
            return None;
        };

        let Some(mut definition) = table_schema.column(field) else {
            tracing::debug!(table, field, "Column not declared");
            return None;
        };

        merge_subtype_override(table_schema, field, subtype, &mut definition);
        self.merge_page_overrides(table, field, subtype, page_id, &mut definition);

        Some(FieldSchema::new(table, field, definition, FieldOrigin::Column))
    }

    /// Resolve and return the subtree at `path` of the effective definition.
    ///
    /// Any missing layer or path segment yields an empty tree.
    pub fn resolve_subtree(
        &self,
        table: &str,
        field: &str,
        page_id: u64,
        subtype: &str,
        path: &str,
    ) -> ConfigTree {
        self.resolve(table, field, page_id, subtype)
            .map(|schema| schema.subtree_or_empty(path))
            .unwrap_or_default()
    }

    fn merge_page_overrides(
        &self,
        table: &str,
        field: &str,
        subtype: &str,
        page_id: u64,
        definition: &mut ConfigTree,
    ) {
        let overrides = [
            self.pages.field_override(page_id, table, field),
            self.pages
                .subtype_field_override(page_id, table, field, subtype),
        ];

        for overlay in overrides.into_iter().flatten() {
            let mut config = definition.subtree_or_empty("config");
            let config_type = config.get_str("type").map(str::to_string);
            let ignored = config.override_known(&overlay, |key| {
                self.allow_list.allows(config_type.as_deref(), key)
            });
            if !ignored.is_empty() {
                tracing::debug!(
                    table,
                    field,
                    page_id,
                    ?ignored,
                    "Ignoring page override keys unknown to the field"
                );
            }
            definition.insert("config", Value::from(config));
        }
    }
}

/// Deep merge the subtype's `columnsOverrides` entry into `definition`
fn merge_subtype_override(
    table_schema: &TableSchema,
    field: &str,
    subtype: &str,
    definition: &mut ConfigTree,
) {
    if subtype.is_empty() {
        return;
    }

    let Some(column_override) = table_schema.columns_override(subtype, field) else {
        return;
    };

    if !column_override.contains_key("config") {
        tracing::debug!(
            table = table_schema.name(),
            field,
            subtype,
            "Subtype override has no config section, ignoring"
        );
        return;
    }

    definition.deep_merge(&column_override);
}
