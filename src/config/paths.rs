//! XDG-compliant path management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Manages the mod manager's on-disk locations
#[derive(Debug, Clone)]
pub struct Paths {
    dirs: ProjectDirs,
}

impl Paths {
    /// Resolve the platform directories for the current user
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "modshelf")
            .context("Failed to determine project directories")?;
        Ok(Self { dirs })
    }

    /// Config directory: ~/.config/modshelf/
    pub fn config_dir(&self) -> PathBuf {
        self.dirs.config_dir().to_path_buf()
    }

    /// Main config file: ~/.config/modshelf/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    /// Log file: ~/.local/share/modshelf/modshelf.log
    pub fn log_file(&self) -> PathBuf {
        self.dirs.data_dir().join("modshelf.log")
    }
}
