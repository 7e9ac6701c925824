//! Crop Sync CLI
//!
//! Runs crop variant synchronization against fixture files holding a schema
//! snapshot, page overrides and stored records.

mod cli;
mod commands;
mod error;
mod fixture;

use clap::Parser;
use colored::Colorize;
use crop_core::SyncSettings;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::resolve::ResolveRequest;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} Crop variant synchronization", "crop-sync".green().bold());
        println!();
        println!("Run {} for available commands.", "crop-sync --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let settings = SyncSettings::discover(cli.settings.as_deref(), &cwd)?;

    match command {
        Commands::Sync {
            fixture,
            dry_run,
            json,
        } => commands::run_sync(&fixture, settings, dry_run, json),
        Commands::Resolve {
            fixture,
            table,
            field,
            page,
            subtype,
            owner,
        } => commands::run_resolve(
            &fixture,
            settings,
            &ResolveRequest {
                table,
                field,
                page,
                subtype,
                owner,
            },
        ),
    }
}

/// Log to stderr: everything at DEBUG when verbose, else as `RUST_LOG` says
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    } else if verbose {
        tracing::debug!("Verbose mode enabled");
    }
}
