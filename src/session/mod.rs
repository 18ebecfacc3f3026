//! Mod manager session
//!
//! A session is created when the mod manager opens for an instance and
//! dropped when it closes. It owns every piece of shared state (file
//! cache, search, selection, installed list, detail panel, batch
//! progress) and exposes the verbs the host UI drives.

pub mod state;

pub use state::PendingConfirm;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

use crate::backend::ModBackend;
use crate::catalog::{ModFileCache, SearchPipeline, SearchState};
use crate::config::Config;
use crate::detail::{DetailPanel, InspectTarget};
use crate::error::{BatchAction, UserError};
use crate::installed::{self, InstalledRegistry};
use crate::models::{Category, InstalledMod, Instance};
use crate::queue::{BatchProgress, BatchReport, DownloadPlan, Orchestrator, PlanItem};
use crate::selection::{
    CheckboxOutcome, Interaction, PanelToggle, RowOutcome, SelectionModel, Tab,
};

pub struct ModManagerSession {
    /// Engine configuration
    config: Config,

    /// Launcher backend
    backend: Arc<dyn ModBackend>,

    /// Instance whose mods directory is managed
    instance: Instance,

    active_tab: Tab,

    /// Per-mod file lists and chosen versions
    files: ModFileCache,

    /// Catalog search and pagination
    search: SearchPipeline,

    /// Mods installed in the instance
    installed: InstalledRegistry,

    /// Display filter for the installed list
    installed_query: String,

    selection: SelectionModel,

    detail: DetailPanel,

    orchestrator: Orchestrator,

    /// Plan awaiting confirmation
    pending: Option<PendingConfirm>,

    /// Result of the last update check
    updates: Vec<InstalledMod>,
    is_checking_updates: bool,

    /// Aggregated batch failure, shown until dismissed
    error: Option<UserError>,
}

impl ModManagerSession {
    /// Open the mod manager for `instance`: loads the installed list and
    /// the catalog categories. Catalog results load on first entry into
    /// the browse tab.
    pub async fn open(
        backend: Arc<dyn ModBackend>,
        instance: Instance,
        config: Config,
    ) -> Result<Self> {
        tracing::info!("Opening mod manager for {}", instance);

        let installed = InstalledRegistry::new(backend.clone(), &config.installed.catalog_id_prefix)?;
        let mut session = Self {
            files: ModFileCache::new(backend.clone()),
            search: SearchPipeline::new(backend.clone(), config.catalog.clone()),
            installed,
            orchestrator: Orchestrator::new(backend.clone()),
            config,
            backend,
            instance,
            active_tab: Tab::default(),
            installed_query: String::new(),
            selection: SelectionModel::default(),
            detail: DetailPanel::new(),
            pending: None,
            updates: Vec::new(),
            is_checking_updates: false,
            error: None,
        };

        session.installed.load(&session.instance).await;
        session.search.load_categories().await;
        Ok(session)
    }

    // ========== Search ==========

    /// Change the catalog query; the search runs after the debounce delay
    pub async fn search(&mut self, query: impl Into<String>) {
        self.search.set_query(query).await;
    }

    pub async fn set_category(&mut self, category_id: i64) {
        self.search.set_category(category_id).await;
    }

    /// Re-run the current search immediately
    pub async fn retry_search(&mut self) {
        self.search.reset().await;
    }

    /// Scroll notification from the catalog list; ignored outside browse
    pub async fn on_scroll(&self, distance_to_bottom: u32) -> bool {
        if self.active_tab != Tab::Browse {
            return false;
        }
        self.search.on_scroll(distance_to_bottom).await
    }

    pub async fn search_state(&self) -> SearchState {
        self.search.snapshot().await
    }

    pub fn categories(&self) -> &[Category] {
        self.search.categories()
    }

    pub fn category_name(&self, category_id: i64) -> &str {
        self.search.category_name(category_id)
    }

    // ========== Tabs and lists ==========

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Switch tabs. The target tab's highlight and the inspected item are
    /// cleared; selections are kept. Entering browse with no results runs
    /// the initial search.
    pub async fn select_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        tracing::debug!("Switching to {:?} tab", tab);
        self.active_tab = tab;
        self.selection.enter_tab(tab);
        self.detail.clear();

        if tab == Tab::Browse {
            self.search.ensure_loaded().await;
        }
    }

    pub fn set_installed_query(&mut self, query: impl Into<String>) {
        self.installed_query = query.into();
    }

    pub fn installed_query(&self) -> &str {
        &self.installed_query
    }

    /// Installed mods as displayed, after the name/author filter
    pub fn installed_mods(&self) -> Vec<&InstalledMod> {
        self.installed.filter(&self.installed_query)
    }

    pub fn is_loading_installed(&self) -> bool {
        self.installed.is_loading()
    }

    fn installed_display_ids(&self) -> Vec<String> {
        self.installed_mods()
            .into_iter()
            .map(|m| m.local_id.clone())
            .collect()
    }

    /// Badge for catalog rows already installed in this instance
    pub fn is_installed_from_catalog(&self, catalog_id: i64) -> bool {
        self.installed.is_installed_from_catalog(catalog_id)
    }

    // ========== Selection ==========

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Row click in the active tab's list
    pub async fn interact_with_item(&mut self, interaction: Interaction) {
        match self.active_tab {
            Tab::Installed => {
                let ids = self.installed_display_ids();
                match self.selection.installed.interact(&ids, interaction) {
                    RowOutcome::Inspect(local_id) | RowOutcome::Toggled { id: local_id, .. } => {
                        self.inspect_installed(&local_id).await;
                    }
                    RowOutcome::Highlighted(_) | RowOutcome::Ignored => {}
                }
            }
            Tab::Browse => {
                let ids = self.search.result_ids().await;
                match self.selection.catalog.interact(&ids, interaction) {
                    RowOutcome::Highlighted(added) => self.prefetch(&added),
                    RowOutcome::Toggled { id, selected } => {
                        if selected {
                            self.files.prefetch(id);
                        }
                        self.inspect_catalog(id).await;
                    }
                    RowOutcome::Inspect(id) => self.inspect_catalog(id).await,
                    RowOutcome::Ignored => {}
                }
            }
        }
    }

    /// Checkbox click in the active tab's list; never opens the detail panel
    pub async fn click_checkbox(&mut self, index: usize, shift: bool) {
        match self.active_tab {
            Tab::Installed => {
                let ids = self.installed_display_ids();
                self.selection.installed.checkbox(&ids, index, shift);
            }
            Tab::Browse => {
                let ids = self.search.result_ids().await;
                match self.selection.catalog.checkbox(&ids, index, shift) {
                    CheckboxOutcome::Highlighted(marked) | CheckboxOutcome::Selected(marked) => {
                        self.prefetch(&marked)
                    }
                    CheckboxOutcome::Deselected(_) | CheckboxOutcome::Ignored => {}
                }
            }
        }
    }

    fn prefetch(&self, mod_ids: &[i64]) {
        for mod_id in mod_ids {
            self.files.prefetch(*mod_id);
        }
    }

    // ========== Detail panel ==========

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn files(&self) -> &ModFileCache {
        &self.files
    }

    /// Show `target` in the detail panel and load its files
    pub async fn inspect(&mut self, target: InspectTarget) {
        let inspection = self.detail.begin(target, &self.config.catalog);

        let (files, chosen) = match inspection.mod_id {
            Some(mod_id) => {
                let files = self.files.get_files(mod_id).await;
                (files, self.files.chosen_version(mod_id).await)
            }
            None => (Arc::new(Vec::new()), None),
        };
        self.detail.resolve(inspection, files, chosen);
    }

    async fn inspect_catalog(&mut self, mod_id: i64) {
        if let Some(m) = self.search.find(mod_id).await {
            self.inspect(InspectTarget::Catalog(m)).await;
        }
    }

    async fn inspect_installed(&mut self, local_id: &str) {
        if let Some(m) = self.installed.find(local_id).cloned() {
            self.inspect(InspectTarget::Installed(m)).await;
        }
    }

    /// Pick the version used when the inspected mod is downloaded
    pub async fn set_active_file(&mut self, file_id: i64) {
        if let Some((mod_id, file_id)) = self.detail.set_active_file(file_id) {
            self.files.choose_version(mod_id, file_id).await;
        }
    }

    /// Select button of the detail panel; acts on the list the inspected
    /// item came from. Returns false when nothing is inspected.
    pub fn toggle_inspected(&mut self) -> bool {
        let Some(view) = self.detail.view() else {
            return false;
        };
        match &view.target {
            InspectTarget::Catalog(m) => {
                let mod_id = m.id;
                if let PanelToggle::Selected(marked) = self.selection.catalog.panel_toggle(&mod_id) {
                    self.prefetch(&marked);
                }
            }
            InspectTarget::Installed(m) => {
                let local_id = m.local_id.clone();
                self.selection.installed.panel_toggle(&local_id);
            }
        }
        true
    }

    /// Caption of the detail panel's select button
    pub fn inspected_toggle_label(&self) -> Option<String> {
        let view = self.detail.view()?;
        Some(match &view.target {
            InspectTarget::Catalog(m) => self
                .selection
                .catalog
                .panel_label(&m.id)
                .text(" for download"),
            InspectTarget::Installed(m) => self.selection.installed.panel_label(&m.local_id).text(""),
        })
    }

    pub fn next_screenshot(&mut self) {
        self.detail.next_screenshot();
    }

    pub fn previous_screenshot(&mut self) {
        self.detail.previous_screenshot();
    }

    pub fn select_screenshot(&mut self, index: usize) {
        self.detail.select_screenshot(index);
    }

    // ========== Batches ==========

    pub fn pending(&self) -> Option<&PendingConfirm> {
        self.pending.as_ref()
    }

    /// Build the download plan for the active tab and hold it for
    /// confirmation. Browse downloads the selected catalog mods; the
    /// installed tab re-downloads selected mods that came from the catalog.
    /// Mods without a resolvable version are skipped.
    pub async fn request_download(&mut self) -> Option<&PendingConfirm> {
        let items = match self.active_tab {
            Tab::Browse => self.catalog_download_items().await,
            Tab::Installed => self.installed_download_items().await,
        };
        self.hold(DownloadPlan::new(BatchAction::Download, items))
    }

    /// Build the delete plan from the installed list's selection and
    /// highlight
    pub fn request_delete(&mut self) -> Option<&PendingConfirm> {
        let displayed = self.installed_display_ids();
        let marked = self.selection.installed.marked();
        let items = self
            .selection
            .installed
            .ordered(&displayed, &marked)
            .into_iter()
            .map(|local_id| {
                let name = self
                    .installed
                    .find(&local_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| local_id.clone());
                PlanItem::uninstall(name, local_id)
            })
            .collect();
        self.hold(DownloadPlan::new(BatchAction::Delete, items))
    }

    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("Cancelled {} plan", pending.action().as_str());
        }
    }

    /// Execute the pending download plan
    pub async fn commit_download(&mut self) -> Option<BatchReport> {
        let plan = self.take_pending(BatchAction::Download)?;
        Some(self.run_batch(plan).await)
    }

    /// Execute the pending delete plan
    pub async fn commit_delete(&mut self) -> Option<BatchReport> {
        let plan = self.take_pending(BatchAction::Delete)?;
        Some(self.run_batch(plan).await)
    }

    fn hold(&mut self, plan: DownloadPlan) -> Option<&PendingConfirm> {
        if plan.is_empty() {
            self.pending = None;
            return None;
        }
        self.pending = Some(PendingConfirm::new(plan));
        self.pending.as_ref()
    }

    fn take_pending(&mut self, action: BatchAction) -> Option<DownloadPlan> {
        if self.pending.as_ref().map(PendingConfirm::action) != Some(action) {
            return None;
        }
        self.pending.take().map(|p| p.plan)
    }

    async fn catalog_download_items(&self) -> Vec<PlanItem> {
        let displayed = self.search.result_ids().await;
        let ids = self
            .selection
            .catalog
            .ordered(&displayed, self.selection.catalog.selected());

        let mut items = Vec::with_capacity(ids.len());
        for mod_id in ids {
            let Some(file_id) = self.files.resolve_version(mod_id).await else {
                tracing::debug!("Skipping mod {}: no version available", mod_id);
                continue;
            };
            let name = match self.search.find(mod_id).await {
                Some(m) => m.name,
                None => format!("Mod #{}", mod_id),
            };
            items.push(PlanItem::install(name, mod_id, file_id));
        }
        items
    }

    async fn installed_download_items(&self) -> Vec<PlanItem> {
        let displayed = self.installed_display_ids();
        let ids = self
            .selection
            .installed
            .ordered(&displayed, self.selection.installed.selected());

        let mut items = Vec::with_capacity(ids.len());
        for local_id in ids {
            let Some((name, catalog_id)) = self
                .installed
                .find(&local_id)
                .and_then(|m| Some((m.name.clone(), m.catalog_id?)))
            else {
                tracing::debug!("Skipping {}: not linked to the catalog", local_id);
                continue;
            };
            let Some(file_id) = self.files.resolve_version(catalog_id).await else {
                tracing::debug!("Skipping {}: no version available", local_id);
                continue;
            };
            items.push(PlanItem::install(name, catalog_id, file_id));
        }
        items
    }

    /// Run a plan, then clear selections, reload the installed list and
    /// surface failures as one message
    async fn run_batch(&mut self, plan: DownloadPlan) -> BatchReport {
        let report = self.orchestrator.execute(plan, &self.instance).await;

        self.selection.clear_all();
        if report.action == BatchAction::Delete {
            self.detail.clear();
        }
        self.installed.load(&self.instance).await;
        if let Some(error) = report.to_error() {
            self.error = Some(error);
        }
        if report.action == BatchAction::Update {
            self.check_updates().await;
        }
        report
    }

    /// Current batch progress; `None` while idle
    pub fn progress(&self) -> Option<BatchProgress> {
        self.orchestrator.progress()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<Option<BatchProgress>> {
        self.orchestrator.subscribe()
    }

    // ========== Updates ==========

    /// Refresh the list of installed mods with a newer catalog file
    pub async fn check_updates(&mut self) -> &[InstalledMod] {
        self.is_checking_updates = true;
        self.updates = installed::check_updates(self.backend.as_ref(), &self.instance).await;
        self.is_checking_updates = false;
        &self.updates
    }

    pub fn updates(&self) -> &[InstalledMod] {
        &self.updates
    }

    pub fn is_checking_updates(&self) -> bool {
        self.is_checking_updates
    }

    /// Files page of an update entry, for its changelog
    pub fn update_files_url(&self, update: &InstalledMod) -> Option<String> {
        self.config
            .catalog
            .files_page_url(update.slug.as_deref(), update.catalog_id)
    }

    /// Install the latest file of every mod from the last update check
    pub async fn confirm_update_all(&mut self) -> Option<BatchReport> {
        let items: Vec<PlanItem> = self
            .updates
            .iter()
            .filter_map(|m| Some(PlanItem::install(m.name.clone(), m.catalog_id?, m.latest_file_id?)))
            .collect();
        if items.is_empty() {
            return None;
        }
        let plan = DownloadPlan::new(BatchAction::Update, items);
        Some(self.run_batch(plan).await)
    }

    // ========== Instance and errors ==========

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Point the session at another instance of the game
    pub async fn set_instance(&mut self, instance: Instance) {
        if instance == self.instance {
            return;
        }
        tracing::info!("Switching mod manager to {}", instance);
        self.instance = instance;
        self.selection.installed.clear();
        self.detail.clear();
        self.pending = None;
        self.updates.clear();
        self.installed.load(&self.instance).await;
    }

    /// Open the instance's mods directory; failures are only logged
    pub async fn open_mods_folder(&self) {
        if let Err(e) = self.backend.open_mods_folder(&self.instance).await {
            tracing::warn!("Failed to open mods folder for {}: {:#}", self.instance, e);
        }
    }

    pub fn error(&self) -> Option<&UserError> {
        self.error.as_ref()
    }

    /// Dismiss the batch error and any search error
    pub async fn dismiss_error(&mut self) {
        self.error = None;
        self.search.dismiss_error().await;
    }
}
