//! Resolve command implementation

use std::path::Path;
use std::sync::Arc;

use crop_core::{CropSynchronizer, SyncSettings};
use serde_json::Value;

use crate::error::{CliError, Result};
use crate::fixture::Fixture;

/// Which field to resolve and for which record context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub table: String,
    pub field: String,
    pub page: u64,
    pub subtype: Option<String>,
    pub owner: Option<u64>,
}

/// Run the resolve command, printing the variants as JSON
pub fn run_resolve(fixture_path: &Path, settings: SyncSettings, request: &ResolveRequest) -> Result<()> {
    let fixture = Fixture::load(fixture_path)?;
    let resolved = resolve_fixture(&fixture, settings, request)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

/// Normalized crop variant configuration of the requested field
pub fn resolve_fixture(fixture: &Fixture, settings: SyncSettings, request: &ResolveRequest) -> Result<Value> {
    let synchronizer = CropSynchronizer::new(
        fixture.registry()?,
        fixture.pages()?,
        Arc::new(fixture.records()?),
        settings,
    );

    let owner = request.owner.unwrap_or_default();
    let subtype = match (&request.subtype, request.owner) {
        (Some(subtype), _) => subtype.clone(),
        (None, Some(owner)) => synchronizer.record_subtype(&request.table, owner),
        (None, None) => String::new(),
    };
    tracing::debug!(table = %request.table, field = %request.field, subtype = %subtype, "Resolving crop variants");

    let config = synchronizer
        .resolve_crop_variants(&request.table, &request.field, request.page, &subtype, owner)?
        .ok_or_else(|| {
            CliError::user(format!(
                "Field {}.{} not found for subtype '{}'",
                request.table, request.field, subtype
            ))
        })?;

    Ok(config.to_json())
}
