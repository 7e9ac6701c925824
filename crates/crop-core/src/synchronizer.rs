//! Copying the first crop variant's selection to the other variants

use std::fmt;
use std::sync::Arc;

use crop_schema::{
    FieldLocator, PageConfigSource, RecordSource, SchemaRegistry, SchemaResolver, StructureSource,
    TcaStructureSource,
};
use crop_variants::{CropVariantCollection, CropVariantsConfig, normalize_variants};
use serde::Serialize;

use crate::error::Result;
use crate::merged::{FieldContext, merged_crop_variants};
use crate::record::SyncableRecord;
use crate::settings::SyncSettings;

/// Why a record was returned without looking at its variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Sync disabled, no crop state, or owner columns missing
    NotEligible,
    /// The field is not governed by any schema
    FieldNotFound,
    /// The persisted crop state cannot be read against the configuration
    InvalidState,
    /// Only one variant, nothing to copy to
    SingleVariant,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEligible => write!(f, "not eligible"),
            Self::FieldNotFound => write!(f, "field not found"),
            Self::InvalidState => write!(f, "invalid crop state"),
            Self::SingleVariant => write!(f, "single variant"),
        }
    }
}

/// What synchronizing one record did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// `variants` variants adopted the canonical crop
    Updated { variants: usize },
    /// All variants already matched the canonical crop
    Unchanged,
    Skipped { reason: SkipReason },
}

impl SyncOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }
}

/// Keeps the crop variants of file references in line with their first
/// variant.
///
/// Holds only immutable snapshots and shared sources, so one instance can
/// serve concurrent callers.
#[derive(Clone)]
pub struct CropSynchronizer {
    locator: FieldLocator,
    records: Arc<dyn RecordSource>,
    settings: SyncSettings,
}

impl CropSynchronizer {
    /// Synchronizer reading composite structures from the registry itself
    pub fn new(
        registry: Arc<SchemaRegistry>,
        pages: Arc<dyn PageConfigSource>,
        records: Arc<dyn RecordSource>,
        settings: SyncSettings,
    ) -> Self {
        let structures = Arc::new(TcaStructureSource::new(registry.clone()));
        Self::with_structures(registry, pages, records, structures, settings)
    }

    pub fn with_structures(
        registry: Arc<SchemaRegistry>,
        pages: Arc<dyn PageConfigSource>,
        records: Arc<dyn RecordSource>,
        structures: Arc<dyn StructureSource>,
        settings: SyncSettings,
    ) -> Self {
        let resolver =
            SchemaResolver::new(registry, pages).with_allow_list(settings.override_allow_list.clone());
        let locator = FieldLocator::new(resolver, records.clone(), structures);
        Self {
            locator,
            records,
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn locator(&self) -> &FieldLocator {
        &self.locator
    }

    /// Subtype of the owning record; empty when the record is missing
    pub fn record_subtype(&self, table: &str, owner_uid: u64) -> String {
        let owner = self.records.record(table, owner_uid).unwrap_or_default();
        self.locator.resolver().registry().record_type(table, &owner)
    }

    /// Normalized crop variants of a field, `None` when it cannot be located
    ///
    /// # Errors
    ///
    /// Returns the configuration error when the merged variants cannot be
    /// normalized.
    pub fn resolve_crop_variants(
        &self,
        table: &str,
        field: &str,
        page_id: u64,
        subtype: &str,
        owner_uid: u64,
    ) -> Result<Option<CropVariantsConfig>> {
        let context = FieldContext {
            table,
            field,
            subtype,
            owner_uid,
            page_id,
        };
        let Some(raw) = merged_crop_variants(&self.locator, &self.settings, context) else {
            return Ok(None);
        };

        Ok(Some(normalize_variants(&raw, &self.settings.image_file_extensions)?))
    }

    /// Synchronize one file reference.
    ///
    /// Records that cannot be synchronized come back unchanged; only
    /// configuration errors are reported.
    pub fn synchronize(&self, record: SyncableRecord) -> Result<SyncableRecord> {
        self.synchronize_with_outcome(record).map(|(record, _)| record)
    }

    /// Like [`CropSynchronizer::synchronize`], also reporting what happened
    pub fn synchronize_with_outcome(
        &self,
        mut record: SyncableRecord,
    ) -> Result<(SyncableRecord, SyncOutcome)> {
        if !record.is_eligible() {
            return Ok((record, SyncOutcome::skipped(SkipReason::NotEligible)));
        }

        let subtype = self.record_subtype(&record.table, record.parent_record_id);
        let Some(config) = self.resolve_crop_variants(
            &record.table,
            &record.field,
            record.page_id,
            &subtype,
            record.parent_record_id,
        )?
        else {
            tracing::debug!(
                uid = record.uid,
                table = %record.table,
                field = %record.field,
                "No schema for field, leaving crop untouched"
            );
            return Ok((record, SyncOutcome::skipped(SkipReason::FieldNotFound)));
        };

        let mut collection = match CropVariantCollection::create(&record.crop_state, &config) {
            Ok(collection) => collection,
            Err(err) if err.is_configuration_error() => return Err(err.into()),
            Err(err) => {
                tracing::debug!(uid = record.uid, error = %err, "Crop state not usable");
                return Ok((record, SyncOutcome::skipped(SkipReason::InvalidState)));
            }
        };

        if collection.len() <= 1 {
            return Ok((record, SyncOutcome::skipped(SkipReason::SingleVariant)));
        }

        let changed = propagate_canonical(&mut collection);
        if changed == 0 {
            tracing::debug!(uid = record.uid, "Crop variants already in sync");
            return Ok((record, SyncOutcome::Unchanged));
        }

        record.crop_state = collection.to_persisted_string();
        tracing::debug!(uid = record.uid, changed, "Synchronized crop variants");
        Ok((record, SyncOutcome::Updated { variants: changed }))
    }
}

/// Copy the first variant's selected ratio and crop area to every other
/// variant allowing that ratio. Returns how many variants changed.
pub fn propagate_canonical(collection: &mut CropVariantCollection) -> usize {
    let Some((canonical, others)) = collection.variants_mut().split_first_mut() else {
        return 0;
    };
    let canonical = &*canonical;
    let Some(ratio) = canonical.selected_ratio() else {
        return 0;
    };

    let mut changed = 0;
    for variant in others {
        if !variant.allows_ratio(ratio) {
            continue;
        }
        if variant.selected_ratio() == Some(ratio) && variant.crop_area == canonical.crop_area {
            continue;
        }
        variant.adopt(canonical);
        changed += 1;
    }
    changed
}
