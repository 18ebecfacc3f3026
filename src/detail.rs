//! Detail panel for the currently inspected item

use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::models::{CatalogMod, InstalledMod, ModFile, Screenshot};

/// The item being inspected, tagged by the list it came from
#[derive(Debug, Clone, PartialEq)]
pub enum InspectTarget {
    Catalog(CatalogMod),
    Installed(InstalledMod),
}

impl InspectTarget {
    /// Catalog id whose files can be listed, if any
    pub fn catalog_id(&self) -> Option<i64> {
        match self {
            InspectTarget::Catalog(m) => Some(m.id),
            InspectTarget::Installed(m) => m.catalog_id,
        }
    }
}

/// Normalized view of an inspected item
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub target: InspectTarget,
    pub name: String,
    pub author: String,
    pub description: String,
    pub screenshots: Vec<Screenshot>,
    /// None when the item has no catalog counterpart; no file listing then
    pub mod_id: Option<i64>,
    pub page_url: Option<String>,
    pub files: Arc<Vec<ModFile>>,
    pub active_file_id: Option<i64>,
}

impl DetailView {
    fn from_target(target: InspectTarget, catalog: &CatalogConfig) -> Self {
        let mod_id = target.catalog_id();
        let (name, author, description, screenshots, page_url) = match &target {
            InspectTarget::Catalog(m) => (
                m.name.clone(),
                m.primary_author().to_string(),
                m.summary.clone(),
                m.screenshots.clone(),
                catalog.mod_page_url(&m.slug),
            ),
            InspectTarget::Installed(m) => (
                m.name.clone(),
                if m.author.trim().is_empty() {
                    "Unknown".to_string()
                } else {
                    m.author.clone()
                },
                m.description.clone(),
                Vec::new(),
                m.slug.as_deref().and_then(|s| catalog.mod_page_url(s)),
            ),
        };

        Self {
            target,
            name,
            author,
            description,
            screenshots,
            mod_id,
            page_url,
            files: Arc::new(Vec::new()),
            active_file_id: None,
        }
    }

    pub fn active_file(&self) -> Option<&ModFile> {
        let id = self.active_file_id?;
        self.files.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Empty,
    LoadingFiles(DetailView),
    Ready(DetailView),
}

/// Handle for one inspection; stale handles are ignored on resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inspection {
    token: u64,
    pub mod_id: Option<i64>,
}

/// Panel state machine: Empty -> LoadingFiles -> Ready. A new inspection
/// restarts at LoadingFiles from any state.
#[derive(Debug, Default)]
pub struct DetailPanel {
    state: PanelState,
    token: u64,
    screenshot: usize,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start inspecting `target`; the carousel resets to the first image
    pub fn begin(&mut self, target: InspectTarget, catalog: &CatalogConfig) -> Inspection {
        self.token += 1;
        self.screenshot = 0;
        let view = DetailView::from_target(target, catalog);
        let mod_id = view.mod_id;
        self.state = PanelState::LoadingFiles(view);
        Inspection {
            token: self.token,
            mod_id,
        }
    }

    /// Finish an inspection with its file list. The active file is the
    /// previously chosen version, else the newest. Returns false when the
    /// inspection was superseded.
    pub fn resolve(
        &mut self,
        inspection: Inspection,
        files: Arc<Vec<ModFile>>,
        chosen: Option<i64>,
    ) -> bool {
        if inspection.token != self.token || !self.is_loading() {
            return false;
        }
        let PanelState::LoadingFiles(view) = std::mem::take(&mut self.state) else {
            return false;
        };

        let active = chosen
            .filter(|id| files.iter().any(|f| f.id == *id))
            .or_else(|| files.first().map(|f| f.id));
        self.state = PanelState::Ready(DetailView {
            files,
            active_file_id: active,
            ..view
        });
        true
    }

    pub fn clear(&mut self) {
        self.token += 1;
        self.screenshot = 0;
        self.state = PanelState::Empty;
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn view(&self) -> Option<&DetailView> {
        match &self.state {
            PanelState::Empty => None,
            PanelState::LoadingFiles(view) | PanelState::Ready(view) => Some(view),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PanelState::LoadingFiles(_))
    }

    /// Pick a different version; returns (mod id, file id) to remember
    pub fn set_active_file(&mut self, file_id: i64) -> Option<(i64, i64)> {
        let PanelState::Ready(view) = &mut self.state else {
            return None;
        };
        let mod_id = view.mod_id?;
        if !view.files.iter().any(|f| f.id == file_id) {
            return None;
        }
        view.active_file_id = Some(file_id);
        Some((mod_id, file_id))
    }

    pub fn screenshot_index(&self) -> usize {
        self.screenshot
    }

    pub fn current_screenshot(&self) -> Option<&Screenshot> {
        self.view()?.screenshots.get(self.screenshot)
    }

    pub fn next_screenshot(&mut self) {
        let count = self.screenshot_count();
        if count > 0 {
            self.screenshot = (self.screenshot + 1) % count;
        }
    }

    pub fn previous_screenshot(&mut self) {
        let count = self.screenshot_count();
        if count > 0 {
            self.screenshot = (self.screenshot + count - 1) % count;
        }
    }

    pub fn select_screenshot(&mut self, index: usize) {
        if index < self.screenshot_count() {
            self.screenshot = index;
        }
    }

    fn screenshot_count(&self) -> usize {
        self.view().map(|v| v.screenshots.len()).unwrap_or(0)
    }
}
