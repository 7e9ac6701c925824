//! Crop variants merged from the generic crop column and a located field

use crop_schema::FieldLocator;
use crop_tree::ConfigTree;

use crate::settings::SyncSettings;

/// Path of a file field's own crop variants inside its definition
pub const FIELD_CROP_VARIANTS_PATH: &str = "config.overrideChildTca.columns.crop.config.cropVariants";

/// Path of the crop variants on the file reference table's crop column
pub const GENERIC_CROP_VARIANTS_PATH: &str = "config.cropVariants";

/// Identifies the field a file reference belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldContext<'a> {
    pub table: &'a str,
    pub field: &'a str,
    pub subtype: &'a str,
    pub owner_uid: u64,
    pub page_id: u64,
}

/// Merge the crop column's generic variants with the located field's own.
///
/// The field's variants are deep-merged over the generic ones. Returns
/// `None` when the field cannot be located.
pub fn merged_crop_variants(
    locator: &FieldLocator,
    settings: &SyncSettings,
    context: FieldContext<'_>,
) -> Option<ConfigTree> {
    let schema = locator.locate(
        context.table,
        context.field,
        context.subtype,
        context.owner_uid,
        context.page_id,
    )?;

    let generic = locator.resolver().resolve_subtree(
        &settings.file_reference_table,
        &settings.crop_field,
        context.page_id,
        "",
        GENERIC_CROP_VARIANTS_PATH,
    );
    let specific = schema.subtree_or_empty(FIELD_CROP_VARIANTS_PATH);

    tracing::debug!(
        table = context.table,
        field = context.field,
        generic = generic.len(),
        specific = specific.len(),
        "Merging crop variants"
    );

    Some(generic.merged(&specific))
}
