//! Configuration loading and mapping extraction
//!
//! The configuration is looked up from one of these locations, first match wins:
//! 1. An explicit path (the `--config` flag)
//! 2. `cmdb-sync.toml` in the working directory
//! 3. `<config_dir>/cmdb-sync/config.toml`

mod mapping;
mod settings;

pub use mapping::{
    ELEMENTS, ElementMapping, RELATIONS, RelationClass, RelationMapping, ServiceSettings,
    SyncConfig,
};
pub use settings::{MAX_CONFIG_SIZE, Settings, WILDCARD};

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "cmdb-sync.toml";

/// Finds the configuration file to use
pub struct ConfigLocator {
    working_dir: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigLocator {
    /// Locator rooted at `working_dir`, using the platform config directory:
    /// - Linux: `~/.config/cmdb-sync/`
    /// - macOS: `~/Library/Application Support/cmdb-sync/`
    /// - Windows: `%APPDATA%\cmdb-sync\`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            global_config_dir_override: None,
        }
    }

    /// Locator with a custom global config directory
    pub fn with_global_config_dir(working_dir: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            working_dir: working_dir.into(),
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("cmdb-sync"))
    }

    /// Path of the configuration file, `explicit` taking precedence
    pub fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let local = self.working_dir.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Ok(local);
        }

        if let Some(global) = self
            .global_config_dir()
            .map(|d| d.join("config.toml"))
            .filter(|p| p.is_file())
        {
            return Ok(global);
        }

        Err(Error::ConfigNotFound { path: local })
    }

    /// Locate and load the settings
    pub fn load(&self, explicit: Option<&Path>) -> Result<Settings> {
        let path = self.locate(explicit)?;
        tracing::debug!(?path, "Using configuration");
        Settings::load(&path)
    }
}
