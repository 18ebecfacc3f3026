//! Download/update/delete batches
//!
//! A `DownloadPlan` is built from the current selection once the user
//! confirms, then consumed by the `Orchestrator`.

pub mod processor;
pub mod state;

pub use processor::{BatchReport, Orchestrator};
pub use state::{BatchProgress, ItemStatus};

use uuid::Uuid;

use crate::error::BatchAction;

/// What to do with one plan item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    Install { mod_id: i64, file_id: i64 },
    /// Deletion targets the local id only
    Uninstall { local_id: String },
}

/// One confirmed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    pub name: String,
    pub action: PlanAction,
}

impl PlanItem {
    pub fn install(name: impl Into<String>, mod_id: i64, file_id: i64) -> Self {
        Self {
            name: name.into(),
            action: PlanAction::Install { mod_id, file_id },
        }
    }

    pub fn uninstall(name: impl Into<String>, local_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: PlanAction::Uninstall {
                local_id: local_id.into(),
            },
        }
    }

    /// Catalog id for installs, local id for deletions
    pub fn target_id(&self) -> String {
        match &self.action {
            PlanAction::Install { mod_id, .. } => mod_id.to_string(),
            PlanAction::Uninstall { local_id } => local_id.clone(),
        }
    }

    pub fn file_id(&self) -> Option<i64> {
        match self.action {
            PlanAction::Install { file_id, .. } => Some(file_id),
            PlanAction::Uninstall { .. } => None,
        }
    }
}

/// Ordered batch awaiting execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub batch_id: String,
    pub action: BatchAction,
    items: Vec<PlanItem>,
}

impl DownloadPlan {
    pub fn new(action: BatchAction, items: Vec<PlanItem>) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            action,
            items,
        }
    }

    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Names shown in the confirmation prompt
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn into_items(self) -> Vec<PlanItem> {
        self.items
    }
}
