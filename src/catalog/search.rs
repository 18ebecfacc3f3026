//! Debounced, page-based catalog search

use std::sync::Arc;
use tokio::sync::RwLock;

use super::Debouncer;
use crate::backend::ModBackend;
use crate::config::CatalogConfig;
use crate::error::UserError;
use crate::models::{CatalogMod, Category};

/// Search slice exposed to the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    /// 0 = all categories
    pub category_id: i64,
    /// Zero-based index of the last requested page
    pub page: usize,
    pub results: Vec<CatalogMod>,
    pub total_count: i64,
    pub has_more: bool,
    pub is_searching: bool,
    pub is_loading_more: bool,
    pub error: Option<UserError>,
    generation: u64,
}

/// Catalog search pipeline
///
/// Query or category changes schedule a debounced reset (page 0, results
/// replaced). Scrolling near the end appends the next page. A page shorter
/// than the configured size marks the catalog exhausted until the next reset.
pub struct SearchPipeline {
    worker: SearchWorker,
    debouncer: Debouncer,
    categories: Vec<Category>,
}

#[derive(Clone)]
struct SearchWorker {
    backend: Arc<dyn ModBackend>,
    config: CatalogConfig,
    state: Arc<RwLock<SearchState>>,
}

impl SearchPipeline {
    pub fn new(backend: Arc<dyn ModBackend>, config: CatalogConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce());
        Self {
            worker: SearchWorker {
                backend,
                config,
                // Nothing to append until the first reset lands
                state: Arc::new(RwLock::new(SearchState::default())),
            },
            debouncer,
            categories: Vec::new(),
        }
    }

    /// Change the query text and schedule a reset
    pub async fn set_query(&mut self, query: impl Into<String>) {
        self.worker.state.write().await.query = query.into();
        self.schedule_reset();
    }

    /// Change the category filter and schedule a reset
    pub async fn set_category(&mut self, category_id: i64) {
        self.worker.state.write().await.category_id = category_id;
        self.schedule_reset();
    }

    /// Arm the debounce timer, replacing any pending reset
    pub fn schedule_reset(&mut self) {
        let worker = self.worker.clone();
        self.debouncer.schedule(async move {
            worker.reset().await;
        });
    }

    pub fn has_pending_reset(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Run a reset immediately, bypassing the debounce
    pub async fn reset(&mut self) {
        self.debouncer.cancel();
        self.worker.reset().await;
    }

    /// Initial load on first entry into the browse view
    pub async fn ensure_loaded(&mut self) -> bool {
        let needs_load = {
            let state = self.worker.state.read().await;
            state.results.is_empty() && !state.is_searching
        };
        if needs_load {
            self.reset().await;
        }
        needs_load
    }

    /// Scroll notification; loads the next page when within the threshold
    /// of the list end. Returns whether a fetch was issued.
    pub async fn on_scroll(&self, distance_to_bottom: u32) -> bool {
        if distance_to_bottom >= self.worker.config.scroll_threshold {
            return false;
        }
        self.load_more().await
    }

    /// Append the next page unless a load is outstanding, the catalog is
    /// exhausted or a filter change is waiting on the debounce. Returns
    /// whether a fetch was issued.
    pub async fn load_more(&self) -> bool {
        if self.has_pending_reset() {
            tracing::trace!("Ignoring load more while a reset is pending");
            return false;
        }
        self.worker.load_more().await
    }

    pub async fn snapshot(&self) -> SearchState {
        self.worker.state.read().await.clone()
    }

    pub async fn find(&self, mod_id: i64) -> Option<CatalogMod> {
        self.worker
            .state
            .read()
            .await
            .results
            .iter()
            .find(|m| m.id == mod_id)
            .cloned()
    }

    pub async fn result_ids(&self) -> Vec<i64> {
        self.worker
            .state
            .read()
            .await
            .results
            .iter()
            .map(|m| m.id)
            .collect()
    }

    pub async fn dismiss_error(&self) {
        self.worker.state.write().await.error = None;
    }

    /// Load the category list; failures leave it empty
    pub async fn load_categories(&mut self) -> &[Category] {
        match self.worker.backend.get_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => {
                tracing::warn!("Failed to load categories: {:#}", e);
                self.categories.clear();
            }
        }
        &self.categories
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Display name of a category filter, "All" for 0 or unknown ids
    pub fn category_name(&self, category_id: i64) -> &str {
        if category_id == 0 {
            return "All";
        }
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("All")
    }
}

impl SearchWorker {
    async fn reset(&self) {
        let (query, category_id, generation) = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.page = 0;
            state.is_searching = true;
            (state.query.clone(), state.category_id, state.generation)
        };

        tracing::debug!(
            "Searching catalog: query={:?} category={} (generation {})",
            query,
            category_id,
            generation
        );
        let result = self.backend.search_catalog(&query, category_id, 0).await;

        let mut state = self.state.write().await;
        if self.config.drop_stale_responses && state.generation != generation {
            tracing::debug!("Dropping stale search response for {:?}", query);
            return;
        }

        match result {
            Ok(page) => {
                state.has_more = page.mods.len() >= self.config.page_size;
                state.total_count = page.total_count;
                state.results = page.mods;
            }
            Err(e) => {
                tracing::warn!("Catalog search failed: {:#}", e);
                state.results.clear();
                state.total_count = 0;
                state.has_more = false;
                state.error = Some(UserError::search(&e));
            }
        }
        state.is_searching = false;
        state.is_loading_more = false;
    }

    async fn load_more(&self) -> bool {
        let (query, category_id, page, generation) = {
            let mut state = self.state.write().await;
            if state.is_loading_more || state.is_searching || !state.has_more {
                return false;
            }
            state.is_loading_more = true;
            state.page += 1;
            (
                state.query.clone(),
                state.category_id,
                state.page,
                state.generation,
            )
        };

        tracing::debug!("Loading catalog page {} for {:?}", page, query);
        let result = self.backend.search_catalog(&query, category_id, page).await;

        let mut state = self.state.write().await;
        if self.config.drop_stale_responses && state.generation != generation {
            tracing::debug!("Dropping page {} from a superseded search", page);
            return true;
        }

        match result {
            Ok(result) => {
                state.has_more = result.mods.len() >= self.config.page_size;
                state.total_count = result.total_count;
                state.results.extend(result.mods);
            }
            Err(e) => {
                tracing::warn!("Loading catalog page {} failed: {:#}", page, e);
                // Retry the same page on the next scroll.
                state.page = state.page.saturating_sub(1);
                state.error = Some(UserError::load_more(&e));
            }
        }
        state.is_loading_more = false;
        true
    }
}
