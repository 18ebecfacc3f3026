//! Installed mods registry and update check

use anyhow::{Context, Result};
use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::ModBackend;
use crate::models::{InstalledMod, Instance};

/// Mods installed in the current instance
pub struct InstalledRegistry {
    backend: Arc<dyn ModBackend>,
    mods: Vec<InstalledMod>,
    catalog_ids: HashSet<i64>,
    catalog_pattern: Regex,
    is_loading: bool,
}

impl InstalledRegistry {
    /// `catalog_id_prefix` ties local ids to catalog ids, e.g. "cf-" for "cf-1234"
    pub fn new(backend: Arc<dyn ModBackend>, catalog_id_prefix: &str) -> Result<Self> {
        let pattern = format!(r"^{}(\d+)$", regex_lite::escape(catalog_id_prefix));
        let catalog_pattern =
            Regex::new(&pattern).context("Invalid installed-from-catalog pattern")?;

        Ok(Self {
            backend,
            mods: Vec::new(),
            catalog_ids: HashSet::new(),
            catalog_pattern,
            is_loading: false,
        })
    }

    /// Replace the cached list with the instance's installed mods.
    /// Failures are logged and leave the list empty.
    pub async fn load(&mut self, instance: &Instance) -> &[InstalledMod] {
        self.is_loading = true;
        let mods = match self.backend.get_installed_mods(instance).await {
            Ok(mods) => {
                tracing::debug!("Loaded {} installed mods for {}", mods.len(), instance);
                mods
            }
            Err(e) => {
                tracing::warn!("Failed to load installed mods for {}: {:#}", instance, e);
                Vec::new()
            }
        };
        self.is_loading = false;

        self.catalog_ids = mods
            .iter()
            .filter_map(|m| self.catalog_id_of(&m.local_id))
            .collect();
        self.mods = mods;
        &self.mods
    }

    pub fn mods(&self) -> &[InstalledMod] {
        &self.mods
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn find(&self, local_id: &str) -> Option<&InstalledMod> {
        self.mods.iter().find(|m| m.local_id == local_id)
    }

    /// Display filter over name and author
    pub fn filter(&self, query: &str) -> Vec<&InstalledMod> {
        filter_mods(&self.mods, query)
    }

    /// Catalog id encoded in a local id, if it was installed from the catalog
    pub fn catalog_id_of(&self, local_id: &str) -> Option<i64> {
        self.catalog_pattern
            .captures(local_id)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Badge check for catalog rows
    pub fn is_installed_from_catalog(&self, catalog_id: i64) -> bool {
        self.catalog_ids.contains(&catalog_id)
    }
}

/// Case-insensitive substring match over name and author; blank matches all
pub fn filter_mods<'a>(mods: &'a [InstalledMod], query: &str) -> Vec<&'a InstalledMod> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return mods.iter().collect();
    }
    mods.iter()
        .filter(|m| {
            m.name.to_lowercase().contains(&query) || m.author.to_lowercase().contains(&query)
        })
        .collect()
}

/// Installed mods whose latest catalog file differs from the installed one.
///
/// A failed check is treated as "no updates".
pub async fn check_updates(backend: &dyn ModBackend, instance: &Instance) -> Vec<InstalledMod> {
    match backend.check_mod_updates(instance).await {
        Ok(mods) => {
            let updates: Vec<InstalledMod> = mods.into_iter().filter(|m| m.has_update()).collect();
            tracing::info!("{} mod update(s) available for {}", updates.len(), instance);
            updates
        }
        Err(e) => {
            tracing::warn!("Failed to check mod updates for {}: {:#}", instance, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{installed_mod, FakeBackend};
    use crate::backend::MockModBackend;

    fn instance() -> Instance {
        Instance::new("release", 1)
    }

    #[tokio::test]
    async fn test_load_replaces_and_badges() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_installed(
            &instance(),
            vec![
                installed_mod("cf-12", "Twelve", Some(12)),
                installed_mod("local-thing", "Thing", None),
            ],
        );
        let mut registry = InstalledRegistry::new(fake.clone(), "cf-").unwrap();

        assert_eq!(registry.load(&instance()).await.len(), 2);
        assert!(registry.is_installed_from_catalog(12));
        assert!(!registry.is_installed_from_catalog(13));

        fake.set_installed(&instance(), vec![installed_mod("cf-13", "Thirteen", Some(13))]);
        registry.load(&instance()).await;
        assert_eq!(registry.mods().len(), 1);
        assert!(!registry.is_installed_from_catalog(12));
        assert!(registry.is_installed_from_catalog(13));
    }

    #[tokio::test]
    async fn test_load_failure_yields_empty() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_installed(&instance(), vec![installed_mod("cf-1", "One", Some(1))]);
        let mut registry = InstalledRegistry::new(fake.clone(), "cf-").unwrap();
        registry.load(&instance()).await;

        *fake.fail_installed.lock().unwrap() = true;
        assert!(registry.load(&instance()).await.is_empty());
        assert!(!registry.is_loading());
    }

    #[test]
    fn test_catalog_id_pattern() {
        let registry = InstalledRegistry::new(Arc::new(FakeBackend::new()), "cf-").unwrap();
        assert_eq!(registry.catalog_id_of("cf-1234"), Some(1234));
        assert_eq!(registry.catalog_id_of("cf-12a"), None);
        assert_eq!(registry.catalog_id_of("xcf-12"), None);
        assert_eq!(registry.catalog_id_of("manual.jar"), None);
    }

    #[test]
    fn test_filter_name_and_author() {
        let mut a = installed_mod("1", "Better Maps", None);
        a.author = "Alice".to_string();
        let mut b = installed_mod("2", "Sounds", None);
        b.author = "MAPmaker".to_string();
        let c = installed_mod("3", "Other", None);
        let mods = vec![a, b, c];

        let names: Vec<&str> = filter_mods(&mods, "map").iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Better Maps", "Sounds"]);
        assert_eq!(filter_mods(&mods, "  ").len(), 3);
        assert!(filter_mods(&mods, "zzz").is_empty());
    }

    #[tokio::test]
    async fn test_check_updates_filters_current() {
        let fake = FakeBackend::new();
        let mut current = installed_mod("cf-1", "Current", Some(1));
        current.file_id = Some(10);
        current.latest_file_id = Some(10);
        let mut stale = installed_mod("cf-2", "Stale", Some(2));
        stale.file_id = Some(20);
        stale.latest_file_id = Some(21);
        *fake.updates.lock().unwrap() = vec![current, stale];

        let updates = check_updates(&fake, &instance()).await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].local_id, "cf-2");
    }

    #[tokio::test]
    async fn test_check_updates_failure_means_none() {
        let fake = FakeBackend::new();
        *fake.fail_updates.lock().unwrap() = true;
        assert!(check_updates(&fake, &instance()).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_calls_backend_once_per_instance() {
        let mut backend = MockModBackend::new();
        backend
            .expect_get_installed_mods()
            .withf(|instance: &Instance| instance.branch == "pre-release" && instance.version == 3)
            .times(1)
            .returning(|_| Ok(vec![installed_mod("cf-5", "Five", Some(5))]));
        backend.expect_check_mod_updates().never();

        let mut registry = InstalledRegistry::new(Arc::new(backend), "cf-").unwrap();
        let mods = registry.load(&Instance::new("pre-release", 3)).await;
        assert_eq!(mods.len(), 1);
        assert!(registry.is_installed_from_catalog(5));
    }
}
