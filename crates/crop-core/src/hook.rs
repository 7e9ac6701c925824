//! Synchronizing file references after a batch of writes
//!
//! A storage layer reports which rows a batch wrote, with ids of newly
//! created rows still given as placeholders plus a substitution table. The
//! hook reloads every written file reference, synchronizes it, and writes
//! back the crop column only when it changed.

use std::collections::HashMap;

use crop_schema::records::record_uid;
use crop_schema::{MemoryRecords, Record, RecordSource};
use crop_tree::is_truthy;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::SyncableRecord;
use crate::synchronizer::{CropSynchronizer, SyncOutcome};

/// Rows written by one batch, keyed by table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: IndexMap<String, Vec<String>>,
    substitutions: HashMap<String, u64>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write of `id` (a uid or a placeholder) in `table`
    pub fn write(&mut self, table: impl Into<String>, id: impl Into<String>) {
        self.writes.entry(table.into()).or_default().push(id.into());
    }

    pub fn with_write(mut self, table: impl Into<String>, id: impl Into<String>) -> Self {
        self.write(table, id);
        self
    }

    /// Map a placeholder id to the uid assigned on insert
    pub fn substitute(&mut self, placeholder: impl Into<String>, uid: u64) {
        self.substitutions.insert(placeholder.into(), uid);
    }

    pub fn with_substitution(mut self, placeholder: impl Into<String>, uid: u64) -> Self {
        self.substitute(placeholder, uid);
        self
    }

    /// Written ids of `table` in write order
    pub fn ids(&self, table: &str) -> &[String] {
        self.writes.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    /// The stored uid for a written id
    pub fn resolve_id(&self, id: &str) -> Option<u64> {
        self.substitutions
            .get(id)
            .copied()
            .or_else(|| id.trim().parse().ok())
            .filter(|uid| *uid > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.writes.values().all(Vec::is_empty)
    }
}

/// Row storage the hook reads file references from and writes crop back to
pub trait RecordStore {
    fn load(&self, table: &str, uid: u64) -> Result<Option<Record>>;

    fn update_field(&mut self, table: &str, uid: u64, field: &str, value: Value) -> Result<()>;
}

impl RecordStore for MemoryRecords {
    fn load(&self, table: &str, uid: u64) -> Result<Option<Record>> {
        Ok(self.record(table, uid))
    }

    fn update_field(&mut self, table: &str, uid: u64, field: &str, value: Value) -> Result<()> {
        let row = self.record_mut(table, uid).ok_or_else(|| Error::Store {
            table: table.to_string(),
            uid,
            message: "row not found".to_string(),
        })?;
        row.insert(field.to_string(), value);
        Ok(())
    }
}

/// A record whose field configuration could not be used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub uid: u64,
    pub message: String,
}

/// Per-record results of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// File references looked at
    pub processed: usize,
    /// Uids whose crop column was rewritten
    pub updated: Vec<u64>,
    /// Uids left untouched, with what happened
    pub untouched: Vec<(u64, SyncOutcome)>,
    /// Written ids skipped before synchronizing (missing row, no crop, sync off)
    pub skipped: Vec<String>,
    /// Records skipped because of a configuration error
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the synchronizer over the file references of a write batch
#[derive(Clone)]
pub struct CropSyncHook {
    synchronizer: CropSynchronizer,
}

impl CropSyncHook {
    pub fn new(synchronizer: CropSynchronizer) -> Self {
        Self { synchronizer }
    }

    pub fn synchronizer(&self) -> &CropSynchronizer {
        &self.synchronizer
    }

    /// Synchronize every file reference written by `batch`.
    ///
    /// Configuration errors skip the affected record and are reported; store
    /// errors abort the batch.
    pub fn process_batch(&self, batch: &WriteBatch, store: &mut dyn RecordStore) -> Result<BatchReport> {
        let settings = self.synchronizer.settings();
        let table = settings.file_reference_table.as_str();
        let crop_field = settings.crop_field.as_str();
        let mut report = BatchReport::default();

        for id in batch.ids(table) {
            let Some(uid) = batch.resolve_id(id) else {
                tracing::debug!(id = %id, "Written id has no stored uid");
                report.skipped.push(id.clone());
                continue;
            };

            let Some(row) = store.load(table, uid)? else {
                report.skipped.push(id.clone());
                continue;
            };
            if !row.get(crop_field).is_some_and(is_truthy) || !row.get("sync_crop_area").is_some_and(is_truthy) {
                report.skipped.push(id.clone());
                continue;
            }

            report.processed += 1;
            let original = row.get(crop_field).cloned();
            let record = SyncableRecord::from_row(row, crop_field)?;

            let (record, outcome) = match self.synchronizer.synchronize_with_outcome(record) {
                Ok(result) => result,
                Err(err) if err.is_configuration_error() => {
                    tracing::warn!(uid, error = %err, "Skipping file reference with invalid crop configuration");
                    report.failures.push(RecordFailure {
                        uid,
                        message: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            let crop = Value::String(record.crop_state);
            if original.as_ref() != Some(&crop) {
                store.update_field(table, uid, crop_field, crop)?;
                report.updated.push(uid);
            } else {
                report.untouched.push((uid, outcome));
            }
        }

        tracing::info!(
            processed = report.processed,
            updated = report.updated.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Processed write batch"
        );
        Ok(report)
    }
}

/// Batch writing every file reference row held in `records`
pub fn batch_for_all(records: &MemoryRecords, table: &str) -> WriteBatch {
    let mut batch = WriteBatch::new();
    for uid in records.rows(table).iter().filter_map(record_uid) {
        batch.write(table, uid.to_string());
    }
    batch
}
