//! Sync command implementation
//!
//! Runs the crop sync hook over every file reference in a fixture, as if the
//! whole table had just been written.

use std::path::Path;

use colored::Colorize;
use crop_core::{BatchReport, CropSyncHook, CropSynchronizer, SyncOutcome, SyncSettings, batch_for_all};

use crate::error::Result;
use crate::fixture::Fixture;

/// Run the sync command
pub fn run_sync(fixture_path: &Path, settings: SyncSettings, dry_run: bool, json: bool) -> Result<()> {
    let mut fixture = Fixture::load(fixture_path)?;
    let report = sync_fixture(&mut fixture, settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, dry_run);
    }

    if !dry_run && !report.updated.is_empty() {
        fixture.save(fixture_path)?;
        if !json {
            println!(
                "{} Wrote {}",
                "OK".green().bold(),
                fixture_path.display().to_string().cyan()
            );
        }
    }

    Ok(())
}

/// Synchronize the fixture's file references in place
pub fn sync_fixture(fixture: &mut Fixture, settings: SyncSettings) -> Result<BatchReport> {
    let mut store = fixture.records()?;
    let table = settings.file_reference_table.clone();

    let synchronizer = CropSynchronizer::new(
        fixture.registry()?,
        fixture.pages()?,
        std::sync::Arc::new(store.clone()),
        settings,
    );
    let hook = CropSyncHook::new(synchronizer);

    let report = hook.process_batch(&batch_for_all(&store, &table), &mut store)?;
    fixture.set_records(&store);
    Ok(report)
}

fn print_report(report: &BatchReport, dry_run: bool) {
    let verb = if dry_run { "Would update" } else { "Updated" };

    println!(
        "{} Processed {} file reference(s)",
        "=>".blue().bold(),
        report.processed
    );

    for uid in &report.updated {
        println!("   {} {} uid {}", "+".green(), verb, uid.to_string().cyan());
    }
    for (uid, outcome) in &report.untouched {
        let detail = match outcome {
            SyncOutcome::Skipped { reason } => reason.to_string(),
            SyncOutcome::Unchanged => "in sync".to_string(),
            SyncOutcome::Updated { .. } => "updated".to_string(),
        };
        println!("   {} uid {} ({})", "-".dimmed(), uid, detail.dimmed());
    }
    for id in &report.skipped {
        println!("   {} {} (no crop or sync disabled)", "-".dimmed(), id.dimmed());
    }
    for failure in &report.failures {
        println!(
            "   {} uid {}: {}",
            "!".red(),
            failure.uid.to_string().yellow(),
            failure.message
        );
    }

    if report.updated.is_empty() {
        println!("{} All crop variants already in sync.", "OK".green().bold());
    }
}
