//! Path management for Roomies
//!
//! ## Path Resolution Order
//!
//! 1. `ROOMIES_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `roomies`
//!    (`~/.config/roomies` on Linux, `~/Library/Application Support/roomies`
//!    on macOS, `%APPDATA%\roomies\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::RoomiesError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "ROOMIES_DATA_DIR";

/// Manages all paths used by Roomies
#[derive(Debug, Clone)]
pub struct RoomiesPaths {
    base_dir: PathBuf,
}

impl RoomiesPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, RoomiesError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create RoomiesPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the entity collections
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn households_file(&self) -> PathBuf {
        self.data_dir().join("households.json")
    }

    pub fn members_file(&self) -> PathBuf {
        self.data_dir().join("members.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn settlements_file(&self) -> PathBuf {
        self.data_dir().join("settlements.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), RoomiesError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| RoomiesError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| RoomiesError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if Roomies has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, RoomiesError> {
    ProjectDirs::from("", "", "roomies")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| RoomiesError::Config("Could not determine a home directory".into()))
}
