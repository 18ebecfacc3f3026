//! Per-mod file cache
//!
//! File lists are fetched at most once per mod per session, sorted newest
//! first, and kept until the session is dropped. The cache also owns the
//! "chosen version" map consumed when building download plans.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::backend::ModBackend;
use crate::models::ModFile;

type FileList = Arc<Vec<ModFile>>;
type InFlight = Shared<BoxFuture<'static, Option<FileList>>>;

/// Shared handle to the session's file cache
#[derive(Clone)]
pub struct ModFileCache {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn ModBackend>,
    files: RwLock<HashMap<i64, FileList>>,
    chosen: RwLock<HashMap<i64, i64>>,
    in_flight: Mutex<HashMap<i64, InFlight>>,
}

impl ModFileCache {
    pub fn new(backend: Arc<dyn ModBackend>) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                files: RwLock::new(HashMap::new()),
                chosen: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Files of `mod_id`, newest first.
    ///
    /// Concurrent callers for the same uncached mod share one backend
    /// fetch. A failed fetch yields an empty list and is not cached.
    pub async fn get_files(&self, mod_id: i64) -> FileList {
        if let Some(files) = self.cached(mod_id).await {
            tracing::trace!("File cache hit for mod {}", mod_id);
            return files;
        }

        let fetch = {
            let mut in_flight = self.inner.in_flight.lock().await;
            // A fetch may have completed between the lookup above and the lock.
            if let Some(files) = self.cached(mod_id).await {
                return files;
            }
            in_flight
                .entry(mod_id)
                .or_insert_with(|| Inner::fetch(self.inner.clone(), mod_id).boxed().shared())
                .clone()
        };

        fetch.await.unwrap_or_else(|| Arc::new(Vec::new()))
    }

    /// Start loading `mod_id` in the background
    pub fn prefetch(&self, mod_id: i64) {
        let cache = self.clone();
        tokio::spawn(async move {
            cache.get_files(mod_id).await;
        });
    }

    pub async fn cached(&self, mod_id: i64) -> Option<FileList> {
        self.inner.files.read().await.get(&mod_id).cloned()
    }

    pub async fn is_loading(&self, mod_id: i64) -> bool {
        self.inner.in_flight.lock().await.contains_key(&mod_id)
    }

    /// Version chosen for `mod_id`, defaulting to the newest once files load
    pub async fn chosen_version(&self, mod_id: i64) -> Option<i64> {
        self.inner.chosen.read().await.get(&mod_id).copied()
    }

    pub async fn choose_version(&self, mod_id: i64, file_id: i64) {
        tracing::debug!("Chose file {} for mod {}", file_id, mod_id);
        self.inner.chosen.write().await.insert(mod_id, file_id);
    }

    /// Chosen version, loading the file list first if nothing was chosen yet
    pub async fn resolve_version(&self, mod_id: i64) -> Option<i64> {
        if let Some(file_id) = self.chosen_version(mod_id).await {
            return Some(file_id);
        }
        self.get_files(mod_id).await;
        self.chosen_version(mod_id).await
    }

    pub async fn len(&self) -> usize {
        self.inner.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Inner {
    async fn fetch(inner: Arc<Inner>, mod_id: i64) -> Option<FileList> {
        tracing::debug!("Fetching files for mod {}", mod_id);

        let result = match inner.backend.get_mod_files(mod_id).await {
            Ok(mut files) => {
                files.sort_by(|a, b| b.release_date.cmp(&a.release_date));
                let files = Arc::new(files);

                inner.files.write().await.insert(mod_id, files.clone());
                if let Some(newest) = files.first() {
                    inner.chosen.write().await.entry(mod_id).or_insert(newest.id);
                }
                Some(files)
            }
            Err(e) => {
                tracing::warn!("Failed to load files for mod {}: {:#}", mod_id, e);
                None
            }
        };

        // Cache insertion happens before this, so later callers either hit
        // the cache or start a fresh fetch after a failure.
        inner.in_flight.lock().await.remove(&mod_id);
        result
    }
}
