//! Locating a field's schema
//!
//! File fields are often not declared on the referencing table but inside
//! the flexible-form structure of one of its columns (a media gallery
//! plugin, for instance). The `FieldLocator` checks the subtype's visible
//! columns first and then searches those structures.

use std::sync::Arc;

use crop_tree::ConfigTree;
use indexmap::IndexMap;

use crate::field::{FieldKind, FieldOrigin, FieldSchema};
use crate::layout::visible_fields;
use crate::records::{Record, RecordSource};
use crate::resolver::SchemaResolver;
use crate::structure::{StructureIdentifier, StructureSource};

/// Finds the schema governing a field, directly or inside composite columns
#[derive(Clone)]
pub struct FieldLocator {
    resolver: SchemaResolver,
    records: Arc<dyn RecordSource>,
    structures: Arc<dyn StructureSource>,
}

impl FieldLocator {
    pub fn new(
        resolver: SchemaResolver,
        records: Arc<dyn RecordSource>,
        structures: Arc<dyn StructureSource>,
    ) -> Self {
        Self {
            resolver,
            records,
            structures,
        }
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Locate the schema of `field` for a record of `table` with `subtype`.
    ///
    /// - Visible column of the subtype: the fully resolved column schema.
    /// - Otherwise the first file reference element named `field` found in the
    ///   structure of a visible composite column, scanning columns in layout
    ///   order and sheets in declaration order.
    /// - A subtype without any layout falls back to the column schema.
    ///
    /// `None` means the field is not governed by any schema here.
    pub fn locate(
        &self,
        table: &str,
        field: &str,
        subtype: &str,
        owner_uid: u64,
        page_id: u64,
    ) -> Option<FieldSchema> {
        let table_schema = self.resolver.registry().table(table)?;

        let Some(visible) = visible_fields(table_schema, subtype) else {
            tracing::debug!(table, subtype, "Subtype declares no layout, using column schema");
            return self.resolver.resolve(table, field, page_id, subtype);
        };

        if visible.contains_key(field) {
            return self.resolver.resolve(table, field, page_id, subtype);
        }

        let found = self.find_in_composites(table, field, owner_uid, &visible);
        if found.is_none() {
            tracing::debug!(table, field, subtype, "Field not found in layout or composite columns");
        }
        found
    }

    fn find_in_composites(
        &self,
        table: &str,
        field: &str,
        owner_uid: u64,
        visible: &IndexMap<String, ConfigTree>,
    ) -> Option<FieldSchema> {
        let mut owner: Option<Record> = None;

        for (container, definition) in visible {
            if FieldKind::of(definition) != FieldKind::Composite {
                continue;
            }

            let record = owner.get_or_insert_with(|| {
                self.records.record(table, owner_uid).unwrap_or_default()
            });

            let Some(identifier) =
                StructureIdentifier::for_column(table, container, definition, record)
            else {
                continue;
            };
            let Some(structure) = self.structures.structure(&identifier) else {
                tracing::debug!(%identifier, "No structure available");
                continue;
            };

            if let Some(schema) = find_element(&structure, table, field, container) {
                tracing::debug!(%identifier, field, sheet = ?schema.origin, "Found field in composite structure");
                return Some(schema);
            }
        }

        None
    }
}

/// First file reference element named `field` across the structure's sheets
fn find_element(
    structure: &ConfigTree,
    table: &str,
    field: &str,
    container: &str,
) -> Option<FieldSchema> {
    let sheets = structure.subtree("sheets")?;

    sheets.subtrees().find_map(|(sheet_name, sheet)| {
        let element = sheet
            .get("ROOT")?
            .get("el")?
            .get(field)?
            .as_object()?
            .clone();
        let element = ConfigTree::from(element);

        (FieldKind::of(&element) == FieldKind::FileCrop).then(|| {
            FieldSchema::new(
                table,
                field,
                element,
                FieldOrigin::CompositeElement {
                    container: container.to_string(),
                    sheet: sheet_name.to_string(),
                },
            )
        })
    })
}
