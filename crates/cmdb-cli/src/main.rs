//! cmdb-sync CLI
//!
//! Imports ServiceNow CMDB tables into an architecture model file.

mod cli;
mod commands;
mod error;
mod logging;
mod progress;

use std::path::Path;

use clap::Parser;
use colored::Colorize;

use cmdb_core::{ConfigLocator, Settings};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitModel { path, name } => {
            logging::init(cli.verbose, None);
            commands::run_init_model(&path, &name)
        }
        Commands::Sync { model, dry_run } => {
            let settings = load_settings(cli.config.as_deref(), cli.verbose)?;
            commands::run_sync(&settings, model.as_deref(), dry_run)
        }
        Commands::Fields => {
            let settings = load_settings(cli.config.as_deref(), cli.verbose)?;
            commands::run_fields(&settings)
        }
    }
}

/// Load the configuration, then install logging at its `log.level`
fn load_settings(explicit: Option<&Path>, verbose: bool) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let settings = ConfigLocator::new(cwd).load(explicit)?;
    logging::init(verbose, settings.get("log.level"));
    if let Some(path) = settings.source() {
        tracing::debug!(?path, "Configuration loaded");
    }
    Ok(settings)
}
