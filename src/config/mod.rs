//! Configuration management for the mod manager
//!
//! Stored as TOML at ~/.config/modshelf/config.toml. Every field has a
//! default, so a partial or missing file is fine.

mod paths;

pub use paths::Paths;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog browsing settings
    pub catalog: CatalogConfig,

    /// Installed mods settings
    pub installed: InstalledConfig,
}

/// Catalog search and pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Nominal page size; a shorter page marks the catalog exhausted
    pub page_size: usize,

    /// Quiet period before a query/category change triggers a reset
    pub debounce_ms: u64,

    /// Distance from the list end (px) that counts as "near the end"
    pub scroll_threshold: u32,

    /// Drop reset responses superseded by a newer reset
    pub drop_stale_responses: bool,

    /// Base URL of the public mod pages
    pub mod_page_base: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            debounce_ms: 300,
            scroll_threshold: 200,
            drop_stale_responses: true,
            mod_page_base: "https://www.curseforge.com/hytale/mods".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Public page of a catalog mod
    pub fn mod_page_url(&self, slug: &str) -> Option<String> {
        if slug.trim().is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.mod_page_base.trim_end_matches('/'), slug))
    }

    /// Files/changelog page, by slug when known, else by catalog id
    pub fn files_page_url(&self, slug: Option<&str>, catalog_id: Option<i64>) -> Option<String> {
        let key = match (slug.filter(|s| !s.trim().is_empty()), catalog_id) {
            (Some(slug), _) => slug.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => return None,
        };
        Some(format!(
            "{}/{}/files",
            self.mod_page_base.trim_end_matches('/'),
            key
        ))
    }
}

/// Installed mods settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledConfig {
    /// Prefix of local ids that were installed from the catalog ("cf-<id>")
    pub catalog_id_prefix: String,
}

impl Default for InstalledConfig {
    fn default() -> Self {
        Self {
            catalog_id_prefix: "cf-".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub async fn load() -> Result<Self> {
        let paths = Paths::new()?;
        Self::load_from(&paths.config_file()).await
    }

    /// Load configuration from `path`, writing defaults when it does not exist
    pub async fn load_from(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            let content = fs::read_to_string(path)
                .await
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            let config = Config::default();
            config.save_to(path).await?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let paths = Paths::new()?;
        self.save_to(&paths.config_file()).await
    }

    /// Save configuration to `path`
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\npage_size = 50\n").unwrap();

        let config = Config::load_from(&path).await.unwrap();
        assert_eq!(config.catalog.page_size, 50);
        assert_eq!(config.catalog.debounce_ms, 300);
        assert_eq!(config.installed.catalog_id_prefix, "cf-");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.catalog.drop_stale_responses = false;
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert!(!loaded.catalog.drop_stale_responses);
    }

    #[test]
    fn test_page_urls() {
        let catalog = CatalogConfig::default();
        assert_eq!(
            catalog.mod_page_url("cool-mod").as_deref(),
            Some("https://www.curseforge.com/hytale/mods/cool-mod")
        );
        assert_eq!(catalog.mod_page_url(""), None);
        assert_eq!(
            catalog.files_page_url(None, Some(42)).as_deref(),
            Some("https://www.curseforge.com/hytale/mods/42/files")
        );
        assert_eq!(catalog.files_page_url(None, None), None);
    }
}
