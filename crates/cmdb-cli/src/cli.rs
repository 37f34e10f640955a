//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cmdb-sync - Import a ServiceNow CMDB into an architecture model
#[derive(Parser, Debug)]
#[command(name = "cmdb-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./cmdb-sync.toml, then the user config directory)
    #[arg(short, long, global = true, env = "CMDB_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize the model with the inventory
    ///
    /// Runs every element table, then the relationship table, and saves
    /// the model.
    ///
    /// Examples:
    ///   cmdb-sync sync                     # Model path from archi.model
    ///   cmdb-sync sync --model infra.json  # Explicit model file
    ///   cmdb-sync sync --dry-run           # Report without saving
    Sync {
        /// Model file to update (defaults to `archi.model` from the configuration)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Report what would change without saving the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the tables and URLs a synchronization would fetch
    Fields,

    /// Write an empty model file
    InitModel {
        /// Path of the model file to create
        path: PathBuf,

        /// Model name
        #[arg(short, long, default_value = "CMDB")]
        name: String,
    },
}
