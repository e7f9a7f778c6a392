//! Path management for ledger-etl
//!
//! ## Path Resolution Order
//!
//! 1. `LEDGER_ETL_HOME` environment variable (if set)
//! 2. The platform config directory: `$XDG_CONFIG_HOME/ledger-etl` or
//!    `~/.config/ledger-etl` on Unix, `%APPDATA%\ledger-etl` on Windows

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::EtlError;

/// Environment variable that overrides the base directory
pub const HOME_ENV_VAR: &str = "LEDGER_ETL_HOME";

/// Manages all paths used by ledger-etl
#[derive(Debug, Clone)]
pub struct EtlPaths {
    /// Base directory for configuration and defaults
    base_dir: PathBuf,
}

impl EtlPaths {
    /// Create a new EtlPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and
    /// `LEDGER_ETL_HOME` is not set.
    pub fn new() -> Result<Self, EtlError> {
        let base_dir = if let Ok(custom) = std::env::var(HOME_ENV_VAR) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create EtlPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the default company directory file (CSV export of the sheet)
    pub fn directory_file(&self) -> PathBuf {
        self.base_dir.join("companies.csv")
    }

    /// Get the default directory exports are written to
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), EtlError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| EtlError::Io(format!("Failed to create base directory: {}", e)))?;

        Ok(())
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, EtlError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| EtlError::Config("Could not determine the home directory".into()))?;
    Ok(dirs.config_dir().join("ledger-etl"))
}
