//! Fields command: show what a synchronization would request

use colored::Colorize;

use cmdb_core::{Settings, SyncConfig};

use crate::error::Result;

/// Print every table with its batch URL
pub fn run_fields(settings: &Settings) -> Result<()> {
    let config = SyncConfig::from_settings(settings)?;
    let urls = config.fetch_urls()?;

    if urls.is_empty() {
        println!("{} No table is mapped", "!".yellow().bold());
        return Ok(());
    }

    for (table, url) in urls {
        let mode = config
            .elements
            .iter()
            .find(|m| m.table == table)
            .map(|m| m.import_mode.to_string())
            .unwrap_or_else(|| "relations".to_string());
        println!("{} {} ({})", "=>".blue().bold(), table.cyan(), mode.dimmed());
        println!("   {url}");
    }
    Ok(())
}
