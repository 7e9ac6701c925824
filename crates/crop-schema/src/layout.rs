//! Subtype layout descriptors
//!
//! A subtype's `showitem` is a comma separated list of items. Each item is
//! `field;label;palette`, where any part may be empty. Palettes expand into
//! their own `showitem` list. Tab dividers (`--div--`) and line breaks are
//! layout-only and never name a field.

use crop_tree::ConfigTree;
use indexmap::IndexMap;

use crate::registry::TableSchema;

const DIVIDER: &str = "--div--";

/// One parsed entry of a layout descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub field: String,
    pub label: Option<String>,
    pub palette: Option<String>,
}

impl LayoutItem {
    fn parse(item: &str) -> Self {
        let mut parts = item.split(';').map(str::trim);
        let field = parts.next().unwrap_or_default().to_string();
        let label = parts.next().filter(|part| !part.is_empty()).map(str::to_string);
        let palette = parts.next().filter(|part| !part.is_empty()).map(str::to_string);
        Self {
            field,
            label,
            palette,
        }
    }

    pub fn is_divider(&self) -> bool {
        self.field == DIVIDER
    }
}

/// Parse a layout descriptor into its items, skipping empty entries.
///
/// # Examples
///
/// ```
/// use crop_schema::parse_showitem;
///
/// let items = parse_showitem("CType, header;Title, --palette--;;gallery,");
/// assert_eq!(items.len(), 3);
/// assert_eq!(items[1].label.as_deref(), Some("Title"));
/// assert_eq!(items[2].palette.as_deref(), Some("gallery"));
/// ```
pub fn parse_showitem(showitem: &str) -> Vec<LayoutItem> {
    showitem
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(LayoutItem::parse)
        .collect()
}

/// Enumerate the columns visible for `subtype`, in layout order.
///
/// Items naming an undeclared column (including palette markers and
/// dividers) contribute no field. Named palettes are expanded in place.
/// Returns `None` when the subtype declares no layout at all.
pub fn visible_fields(table: &TableSchema, subtype: &str) -> Option<IndexMap<String, ConfigTree>> {
    let showitem = table.showitem(subtype)?;
    let mut fields = IndexMap::new();

    for item in parse_showitem(showitem) {
        if item.is_divider() {
            continue;
        }

        add_column(table, &item.field, &mut fields);

        let Some(palette) = item.palette.as_deref() else {
            continue;
        };
        let Some(palette_showitem) = table.palette_showitem(palette) else {
            tracing::debug!(table = table.name(), palette, "Palette has no layout");
            continue;
        };
        for palette_item in parse_showitem(palette_showitem) {
            add_column(table, &palette_item.field, &mut fields);
        }
    }

    Some(fields)
}

fn add_column(table: &TableSchema, field: &str, fields: &mut IndexMap<String, ConfigTree>) {
    if field.is_empty() {
        return;
    }
    if let Some(definition) = table.column(field) {
        fields.insert(field.to_string(), definition);
    }
}
