//! Catalog and install-state data model shared by every component

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One game installation's mod directory, identified by (branch, version)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
    pub branch: String,
    pub version: i32,
}

impl Instance {
    pub fn new(branch: impl Into<String>, version: i32) -> Self {
        Self {
            branch: branch.into(),
            version,
        }
    }

    /// Human readable label, e.g. "Release v3" or "Pre-Release v7"
    pub fn label(&self) -> String {
        let branch = if self.branch == "release" {
            "Release"
        } else {
            "Pre-Release"
        };
        format!("{} v{}", branch, self.version)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.branch, self.version)
    }
}

/// Release channel of a downloadable file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ReleaseType {
    Release,
    Beta,
    Alpha,
    #[default]
    Unknown,
}

impl From<i32> for ReleaseType {
    fn from(value: i32) -> Self {
        match value {
            1 => ReleaseType::Release,
            2 => ReleaseType::Beta,
            3 => ReleaseType::Alpha,
            _ => ReleaseType::Unknown,
        }
    }
}

impl From<ReleaseType> for i32 {
    fn from(value: ReleaseType) -> Self {
        match value {
            ReleaseType::Release => 1,
            ReleaseType::Beta => 2,
            ReleaseType::Alpha => 3,
            ReleaseType::Unknown => 0,
        }
    }
}

impl ReleaseType {
    pub fn label(&self) -> &'static str {
        match self {
            ReleaseType::Release => "Release",
            ReleaseType::Beta => "Beta",
            ReleaseType::Alpha => "Alpha",
            ReleaseType::Unknown => "Unknown",
        }
    }
}

/// A downloadable version of a catalog mod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModFile {
    pub id: i64,
    pub mod_id: i64,
    pub display_name: String,
    pub file_name: String,
    #[serde(rename = "fileLength")]
    pub length: u64,
    pub download_url: String,
    #[serde(rename = "fileDate")]
    pub release_date: DateTime<Utc>,
    pub release_type: ReleaseType,
}

impl ModFile {
    /// Label used in version pickers: "<display name> [<release type>]"
    pub fn option_label(&self) -> String {
        format!(
            "{} [{}]",
            self.display_name,
            self.release_type.label().to_lowercase()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    pub thumbnail_url: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

/// Catalog category; id 0 means "all categories"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Remote catalog entry, an immutable snapshot from a search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMod {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub download_count: u64,
    #[serde(rename = "logo", default)]
    pub logo_ref: Option<Logo>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub latest_files: Vec<ModFile>,
}

impl CatalogMod {
    /// First listed author, or "Unknown"
    pub fn primary_author(&self) -> &str {
        self.authors
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown")
    }
}

/// Locally installed mod within one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledMod {
    #[serde(rename = "id")]
    pub local_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(rename = "curseForgeId", default)]
    pub catalog_id: Option<i64>,
    #[serde(default)]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub latest_file_id: Option<i64>,
}

impl InstalledMod {
    /// True when the catalog reports a newer file than the installed one
    pub fn has_update(&self) -> bool {
        match self.latest_file_id {
            Some(latest) => self.file_id != Some(latest),
            None => false,
        }
    }
}

/// One page of catalog search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub mods: Vec<CatalogMod>,
    pub total_count: i64,
}

/// Compact download count: 1.2M, 3.4K, 999
pub fn format_downloads(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}
