//! Scripted in-memory backend for tests

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::ModBackend;
use crate::models::{
    Author, CatalogMod, Category, InstalledMod, Instance, ModFile, ReleaseType, Screenshot,
    SearchPage,
};

pub const PAGE_SIZE: usize = 20;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search { query: String, category: i64, page: usize },
    Files(i64),
    Categories,
    Installed(Instance),
    Install { mod_id: i64, file_id: i64 },
    Uninstall(String),
    Updates(Instance),
    OpenFolder(Instance),
}

#[derive(Default)]
pub struct FakeBackend {
    pub catalog: Mutex<Vec<CatalogMod>>,
    pub files: Mutex<HashMap<i64, Vec<ModFile>>>,
    pub installed: Mutex<HashMap<Instance, Vec<InstalledMod>>>,
    pub updates: Mutex<Vec<InstalledMod>>,
    pub categories: Vec<Category>,

    pub fail_search_pages: Mutex<HashSet<usize>>,
    pub fail_files: Mutex<HashSet<i64>>,
    pub fail_installs: Mutex<HashSet<i64>>,
    pub fail_uninstalls: Mutex<HashSet<String>>,
    pub fail_installed: Mutex<bool>,
    pub fail_updates: Mutex<bool>,
    pub fail_categories: bool,

    /// Artificial latency per search query
    pub search_delays: Mutex<HashMap<String, Duration>>,
    pub files_delay: Mutex<Option<Duration>>,

    pub calls: Mutex<Vec<Call>>,
}

pub fn mod_file(mod_id: i64, id: i64, day: u32) -> ModFile {
    ModFile {
        id,
        mod_id,
        display_name: format!("mod{}-file{}", mod_id, id),
        file_name: format!("mod{}-{}.jar", mod_id, id),
        length: 1024,
        download_url: format!("https://files.invalid/{}/{}", mod_id, id),
        release_date: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        release_type: ReleaseType::Release,
    }
}

pub fn catalog_mod(id: i64, name: &str) -> CatalogMod {
    CatalogMod {
        id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        summary: format!("{} summary", name),
        download_count: 100,
        logo_ref: None,
        screenshots: vec![
            Screenshot {
                id: id * 10,
                title: "one".to_string(),
                thumbnail_url: String::new(),
                url: format!("https://img.invalid/{}/1.png", id),
            },
            Screenshot {
                id: id * 10 + 1,
                title: "two".to_string(),
                thumbnail_url: String::new(),
                url: format!("https://img.invalid/{}/2.png", id),
            },
        ],
        authors: vec![Author {
            name: format!("author{}", id),
        }],
        categories: Vec::new(),
        latest_files: Vec::new(),
    }
}

pub fn installed_mod(local_id: &str, name: &str, catalog_id: Option<i64>) -> InstalledMod {
    InstalledMod {
        local_id: local_id.to_string(),
        name: name.to_string(),
        version: "1.0".to_string(),
        author: format!("{} author", name),
        description: format!("{} description", name),
        enabled: true,
        slug: None,
        icon_url: None,
        catalog_id,
        file_id: None,
        latest_version: None,
        latest_file_id: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of `count` mods named "Mod 0".."Mod n", each with two files
    pub fn with_catalog(count: usize) -> Self {
        let fake = Self::new();
        {
            let mut catalog = fake.catalog.lock().unwrap();
            let mut files = fake.files.lock().unwrap();
            for i in 0..count as i64 {
                catalog.push(catalog_mod(i + 1, &format!("Mod {}", i)));
                files.insert(
                    i + 1,
                    vec![mod_file(i + 1, (i + 1) * 100, 1), mod_file(i + 1, (i + 1) * 100 + 1, 5)],
                );
            }
        }
        fake
    }

    pub fn set_installed(&self, instance: &Instance, mods: Vec<InstalledMod>) {
        self.installed
            .lock()
            .unwrap()
            .insert(instance.clone(), mods);
    }

    pub fn installed_ids(&self, instance: &Instance) -> Vec<String> {
        self.installed
            .lock()
            .unwrap()
            .get(instance)
            .map(|mods| mods.iter().map(|m| m.local_id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ModBackend for FakeBackend {
    async fn search_catalog(&self, query: &str, category_id: i64, page: usize) -> Result<SearchPage> {
        self.record(Call::Search {
            query: query.to_string(),
            category: category_id,
            page,
        });

        let delay = self.search_delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_search_pages.lock().unwrap().contains(&page) {
            bail!("catalog unavailable");
        }

        let needle = query.to_lowercase();
        let matching: Vec<CatalogMod> = self
            .catalog
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .filter(|m| category_id == 0 || m.categories.iter().any(|c| c.id == category_id))
            .cloned()
            .collect();

        let total_count = matching.len() as i64;
        let mods = matching
            .into_iter()
            .skip(page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();

        Ok(SearchPage { mods, total_count })
    }

    async fn get_mod_files(&self, mod_id: i64) -> Result<Vec<ModFile>> {
        self.record(Call::Files(mod_id));

        let delay = *self.files_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_files.lock().unwrap().contains(&mod_id) {
            bail!("files unavailable for {}", mod_id);
        }
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&mod_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        self.record(Call::Categories);
        if self.fail_categories {
            bail!("categories unavailable");
        }
        Ok(self.categories.clone())
    }

    async fn get_installed_mods(&self, instance: &Instance) -> Result<Vec<InstalledMod>> {
        self.record(Call::Installed(instance.clone()));
        if *self.fail_installed.lock().unwrap() {
            bail!("mods directory unreadable");
        }
        Ok(self
            .installed
            .lock()
            .unwrap()
            .get(instance)
            .cloned()
            .unwrap_or_default())
    }

    async fn install_mod_file(&self, mod_id: i64, file_id: i64, instance: &Instance) -> Result<()> {
        self.record(Call::Install { mod_id, file_id });
        if self.fail_installs.lock().unwrap().contains(&mod_id) {
            bail!("download failed");
        }

        let local_id = format!("cf-{}", mod_id);
        let mut installed = self.installed.lock().unwrap();
        let mods = installed.entry(instance.clone()).or_default();
        mods.retain(|m| m.local_id != local_id);
        let mut record = installed_mod(&local_id, &format!("Mod {}", mod_id - 1), Some(mod_id));
        record.file_id = Some(file_id);
        mods.push(record);
        Ok(())
    }

    async fn uninstall_mod(&self, local_id: &str, instance: &Instance) -> Result<()> {
        self.record(Call::Uninstall(local_id.to_string()));
        if self.fail_uninstalls.lock().unwrap().contains(local_id) {
            bail!("file is locked");
        }
        if let Some(mods) = self.installed.lock().unwrap().get_mut(instance) {
            mods.retain(|m| m.local_id != local_id);
        }
        Ok(())
    }

    async fn check_mod_updates(&self, instance: &Instance) -> Result<Vec<InstalledMod>> {
        self.record(Call::Updates(instance.clone()));
        if *self.fail_updates.lock().unwrap() {
            bail!("update service unreachable");
        }
        Ok(self.updates.lock().unwrap().clone())
    }

    async fn open_mods_folder(&self, instance: &Instance) -> Result<()> {
        self.record(Call::OpenFolder(instance.clone()));
        bail!("no file manager available")
    }
}
