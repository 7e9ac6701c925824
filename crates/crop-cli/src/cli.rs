//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Crop Sync - keep the crop variants of file references in line with the
/// first variant
#[derive(Parser, Debug)]
#[command(name = "crop-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ./crop-sync.toml when present)
    #[arg(long, global = true, env = "CROP_SYNC_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize every file reference in a fixture
    ///
    /// The fixture holds `tca`, `page_config` and `records` as JSON, TOML
    /// or YAML (picked by extension). Updated crop values are written back
    /// to the same file.
    ///
    /// Examples:
    ///   crop-sync sync site.json
    ///   crop-sync sync site.yaml --dry-run --json
    Sync {
        /// Fixture file
        fixture: PathBuf,

        /// Report changes without writing the fixture
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the normalized crop variants of a field
    Resolve {
        /// Fixture file
        fixture: PathBuf,

        /// Table owning the field
        #[arg(long)]
        table: String,

        /// Field name, either a column or a composite element
        #[arg(long)]
        field: String,

        /// Page whose overrides apply
        #[arg(long)]
        page: u64,

        /// Subtype of the owning record (read from --owner when omitted)
        #[arg(long)]
        subtype: Option<String>,

        /// Uid of the owning record
        #[arg(long)]
        owner: Option<u64>,
    },
}
