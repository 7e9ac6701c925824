//! Site workflow tests
//!
//! Runs the crop sync hook against the checked-in site fixture: generic
//! crop variants on the file reference table, a content column and a news
//! column with their own variants, and rows that must be skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crop_core::{
    CropSyncHook, CropSynchronizer, SyncOutcome, SyncSettings, WriteBatch, batch_for_all,
};
use crop_schema::{MemoryRecords, PageConfigRegistry, RecordSource, SchemaRegistry};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

const TABLE: &str = "sys_file_reference";

// =============================================================================
// Test Infrastructure
// =============================================================================

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

fn site() -> Value {
    let content = fs::read_to_string(fixtures_dir().join("workspaces/site.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn settings() -> SyncSettings {
    SyncSettings::load(&fixtures_dir().join("crop-sync.toml")).unwrap()
}

/// Hook and store built from the site fixture
fn setup() -> (CropSyncHook, MemoryRecords) {
    let site = site();
    let store = MemoryRecords::from_json(site["records"].clone()).unwrap();
    let synchronizer = CropSynchronizer::new(
        Arc::new(SchemaRegistry::from_json(site["tca"].clone()).unwrap()),
        Arc::new(PageConfigRegistry::from_json(site["page_config"].clone()).unwrap()),
        Arc::new(store.clone()),
        settings(),
    );
    (CropSyncHook::new(synchronizer), store)
}

fn crop_of(store: &MemoryRecords, uid: u64) -> Value {
    let row = store.record(TABLE, uid).unwrap();
    serde_json::from_str(row["crop"].as_str().unwrap()).unwrap()
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_settings_file_layers_over_defaults() {
    let settings = settings();
    assert_eq!(settings.image_file_extensions, "jpg,jpeg,png,webp");
    assert_eq!(settings.file_reference_table, TABLE);
    assert_eq!(settings.crop_field, "crop");
    assert!(settings.override_allow_list.allows(Some("file"), "cropVariants"));
    // Built-in entries survive
    assert!(settings.override_allow_list.allows(Some("input"), "size"));
}

// =============================================================================
// Full batch
// =============================================================================

#[test]
fn test_site_batch() {
    let (hook, mut store) = setup();

    let report = hook
        .process_batch(&batch_for_all(&store, TABLE), &mut store)
        .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.updated, vec![20, 21]);
    assert_eq!(report.skipped, vec!["22".to_string(), "23".to_string()]);
    assert!(report.untouched.is_empty());
    assert!(!report.has_failures());
}

#[test]
fn test_content_image_mobile_follows_default() {
    let (hook, mut store) = setup();
    hook.process_batch(&batch_for_all(&store, TABLE), &mut store)
        .unwrap();

    let crop = crop_of(&store, 20);
    assert_eq!(crop["mobile"]["selectedRatio"], json!("16:9"));
    assert_eq!(
        crop["mobile"]["cropArea"],
        json!({"x": 0.0, "y": 0.2, "width": 1.0, "height": 0.5625})
    );
    assert_eq!(crop["mobile"]["focusArea"], Value::Null);
}

#[test]
fn test_generic_variant_is_canonical_for_news() {
    let (hook, mut store) = setup();
    hook.process_batch(&batch_for_all(&store, TABLE), &mut store)
        .unwrap();

    let crop = crop_of(&store, 21);
    let ids: Vec<_> = crop.as_object().unwrap().keys().cloned().collect();
    assert_eq!(ids, vec!["default", "teaser", "detail"]);

    assert_eq!(crop["teaser"]["cropArea"], crop["default"]["cropArea"]);
    // `detail` does not allow 16:9
    assert_eq!(crop["detail"]["selectedRatio"], json!("1:1"));
    assert_eq!(
        crop["detail"]["cropArea"],
        json!({"x": 0.2, "y": 0.0, "width": 0.6, "height": 1.0})
    );
}

#[rstest]
#[case::sync_disabled(22)]
#[case::empty_crop(23)]
fn test_skipped_rows_are_untouched(#[case] uid: u64) {
    let (hook, mut store) = setup();
    let before = store.record(TABLE, uid);

    let batch = WriteBatch::new().with_write(TABLE, uid.to_string());
    let report = hook.process_batch(&batch, &mut store).unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(store.record(TABLE, uid), before);
}

#[test]
fn test_second_run_is_noop() {
    let (hook, mut store) = setup();
    let batch = batch_for_all(&store, TABLE);
    hook.process_batch(&batch, &mut store).unwrap();
    let synced = store.clone();

    let report = hook.process_batch(&batch, &mut store).unwrap();

    assert!(report.updated.is_empty());
    assert_eq!(
        report.untouched,
        vec![(20, SyncOutcome::Unchanged), (21, SyncOutcome::Unchanged)]
    );
    assert_eq!(store, synced);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_resolve_merges_generic_and_field_variants() {
    let (hook, _) = setup();
    let synchronizer = hook.synchronizer();

    let subtype = synchronizer.record_subtype("tx_news_domain_model_news", 5);
    assert_eq!(subtype, "0");

    let config = synchronizer
        .resolve_crop_variants("tx_news_domain_model_news", "fal_media", 4, &subtype, 5)
        .unwrap()
        .unwrap();
    assert_eq!(
        config.variant_ids().collect::<Vec<_>>(),
        vec!["default", "teaser", "detail"]
    );
    assert_eq!(config.allowed_extensions, "jpg,jpeg,png,webp");
}

#[test]
fn test_resolve_unknown_field() {
    let (hook, _) = setup();
    let resolved = hook
        .synchronizer()
        .resolve_crop_variants("tt_content", "assets", 1, "textmedia", 1)
        .unwrap();
    assert!(resolved.is_none());
}
