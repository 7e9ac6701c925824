//! Layered field schema resolution
//!
//! Resolves the effective configuration of one column on one table by
//! stacking three layers (lowest to highest priority):
//!
//! 1. The column definition in the [`SchemaRegistry`] snapshot
//! 2. The subtype's `columnsOverrides` entry (deep merge)
//! 3. Page-scoped overrides, generic then subtype-specific (known-key override)
//!
//! The [`FieldLocator`] additionally finds file fields that are not declared
//! on the table itself but inside a flexible-form structure attached to one of
//! its visible columns.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use crop_schema::{PageConfigRegistry, SchemaRegistry, SchemaResolver};
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::from_json(json!({
//!     "tt_content": {
//!         "columns": {"image": {"config": {"type": "file", "maxitems": 5}}}
//!     }
//! })).unwrap();
//!
//! let resolver = SchemaResolver::new(Arc::new(registry), Arc::new(PageConfigRegistry::new()));
//! let schema = resolver.resolve("tt_content", "image", 1, "").unwrap();
//! assert_eq!(schema.config_type(), Some("file"));
//! assert!(resolver.resolve("tt_content", "missing", 1, "").is_none());
//! ```

pub mod error;
pub mod field;
pub mod layout;
pub mod locator;
pub mod overrides;
pub mod page_config;
pub mod records;
pub mod registry;
pub mod resolver;
pub mod structure;

pub use error::{Error, Result};
pub use field::{FieldKind, FieldOrigin, FieldSchema};
pub use layout::{LayoutItem, parse_showitem, visible_fields};
pub use locator::FieldLocator;
pub use overrides::OverrideAllowList;
pub use page_config::{PageConfigRegistry, PageConfigSource};
pub use records::{MemoryRecords, Record, RecordSource};
pub use registry::{SchemaRegistry, TableSchema};
pub use resolver::SchemaResolver;
pub use structure::{StructureIdentifier, StructureSource, TcaStructureSource};
