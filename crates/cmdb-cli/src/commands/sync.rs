//! Sync command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;

use cmdb_core::{BatchReport, Importer, Settings, SyncConfig, SyncReport};
use cmdb_model::Model;
use cmdb_remote::HttpFetcher;

use crate::error::{CliError, Result};
use crate::progress::LogProgress;

/// Model file to update: the flag, else `archi.model` relative to the
/// configuration file
pub fn resolve_model_path(settings: &Settings, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let configured = settings
        .get_string("archi.model", None, false)
        .ok_or_else(|| CliError::user("No model file: pass --model or set archi.model"))?;
    let path = PathBuf::from(configured);
    if path.is_relative() {
        if let Some(dir) = settings.source().and_then(Path::parent) {
            return Ok(dir.join(path));
        }
    }
    Ok(path)
}

/// Run the sync command
pub fn run_sync(settings: &Settings, model: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = SyncConfig::from_settings(settings)?;
    let model_path = resolve_model_path(settings, model)?;
    println!(
        "{} Synchronizing {}",
        "=>".blue().bold(),
        model_path.display().to_string().cyan()
    );

    let mut model = Model::load(&model_path)?;
    let service = &config.service;
    let fetcher = HttpFetcher::new(
        service.credentials.clone(),
        service.proxy.as_ref(),
        service.timeout,
    )?;
    let progress = LogProgress::new();
    let report = Importer::new(&config, &fetcher)
        .with_progress(&progress)
        .run(&mut model);

    print_report(&report);

    if dry_run {
        println!("{} Model not saved", "[dry-run]".yellow());
    } else if report.changes() > 0 {
        model.save(&model_path)?;
        println!("{} Model saved", "OK".green().bold());
    } else {
        println!("{} Model already up to date", "OK".green().bold());
    }

    if report.cancelled {
        return Err(CliError::user("Synchronization cancelled"));
    }
    let aborted = report.batches.iter().filter(|b| b.is_aborted()).count();
    if aborted > 0 {
        return Err(CliError::user(format!("{aborted} table(s) could not be imported")));
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!();
    for batch in &report.batches {
        println!("   {} {}", status_tag(batch), batch);
        for error in &batch.errors {
            println!("      {} {}: {}", "-".yellow(), error.id.cyan(), error.message);
        }
    }
    println!();
    println!(
        "{} {} created, {} updated, {} removed",
        "Total:".bold(),
        report.created(),
        report.updated(),
        report.removed()
    );
}

fn status_tag(batch: &BatchReport) -> colored::ColoredString {
    if batch.is_aborted() {
        "ABORTED".red().bold()
    } else if !batch.errors.is_empty() {
        "WARN".yellow().bold()
    } else {
        "OK".green().bold()
    }
}
