//! Launcher backend contract
//!
//! The mod manager never talks to the catalog service or the instance's
//! mod directory directly; every remote or filesystem effect goes through
//! a `ModBackend`. Transport is up to the host.

#[cfg(test)]
pub(crate) mod fake;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Category, InstalledMod, Instance, ModFile, SearchPage};

/// Operations consumed from the launcher backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModBackend: Send + Sync {
    /// Search the remote catalog. `category_id` 0 means all categories,
    /// `page` is zero-based.
    async fn search_catalog(&self, query: &str, category_id: i64, page: usize)
        -> Result<SearchPage>;

    /// All downloadable files of a catalog mod, in backend order
    async fn get_mod_files(&self, mod_id: i64) -> Result<Vec<ModFile>>;

    async fn get_categories(&self) -> Result<Vec<Category>>;

    async fn get_installed_mods(&self, instance: &Instance) -> Result<Vec<InstalledMod>>;

    /// Download and install one file into the instance's mod directory
    async fn install_mod_file(&self, mod_id: i64, file_id: i64, instance: &Instance)
        -> Result<()>;

    async fn uninstall_mod(&self, local_id: &str, instance: &Instance) -> Result<()>;

    /// Installed mods annotated with the latest available file
    async fn check_mod_updates(&self, instance: &Instance) -> Result<Vec<InstalledMod>>;

    async fn open_mods_folder(&self, instance: &Instance) -> Result<()>;
}
