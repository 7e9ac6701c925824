//! Crop area synchronization
//!
//! Ties the schema layer and the crop variant layer together:
//!
//! ```text
//!   CropSyncHook (write batch, record store)
//!        |
//!   CropSynchronizer ---- record subtype (owning record)
//!        |
//!   merged_crop_variants  <- FieldLocator / SchemaResolver
//!        |
//!   normalize + CropVariantCollection
//!        |
//!   propagate_canonical -> persisted crop string
//! ```
//!
//! The first configured crop variant is canonical. Its selected ratio and
//! crop area are copied to every other variant that allows the same ratio.

pub mod error;
pub mod hook;
pub mod merged;
pub mod record;
pub mod settings;
pub mod synchronizer;

pub use error::{Error, Result};
pub use hook::{BatchReport, CropSyncHook, RecordFailure, RecordStore, WriteBatch, batch_for_all};
pub use merged::{FieldContext, merged_crop_variants};
pub use record::SyncableRecord;
pub use settings::{SettingsFile, SyncSettings};
pub use synchronizer::{CropSynchronizer, SkipReason, SyncOutcome, propagate_canonical};
