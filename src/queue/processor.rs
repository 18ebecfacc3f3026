//! Sequential batch executor

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use super::{BatchProgress, DownloadPlan, ItemStatus, PlanAction, PlanItem};
use crate::backend::ModBackend;
use crate::error::{describe, BatchAction, UserError};
use crate::models::Instance;

/// Outcome of one executed plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batch_id: String,
    pub action: BatchAction,
    /// Final status per item, in plan order
    pub items: Vec<(String, ItemStatus)>,
    /// "<name>: <message>" per failed item
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, status)| *status == ItemStatus::Completed)
            .count()
    }

    /// One aggregated error for the whole batch, if anything failed
    pub fn to_error(&self) -> Option<UserError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(UserError::BatchFailed {
                action: self.action,
                failures: self.failures.clone(),
            })
        }
    }
}

/// Executes plans one item at a time.
///
/// Install and uninstall mutate the instance's mod directory, so items
/// never run in parallel and overlapping `execute` calls queue behind
/// each other.
pub struct Orchestrator {
    backend: Arc<dyn ModBackend>,
    progress: watch::Sender<Option<BatchProgress>>,
    running: Mutex<()>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ModBackend>) -> Self {
        let (progress, _) = watch::channel(None);
        Self {
            backend,
            progress,
            running: Mutex::new(()),
        }
    }

    /// Progress updates; `None` while idle
    pub fn subscribe(&self) -> watch::Receiver<Option<BatchProgress>> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> Option<BatchProgress> {
        self.progress.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.progress.borrow().is_some()
    }

    /// Run every item in order. A failing item is recorded and the batch
    /// continues with the next one.
    pub async fn execute(&self, plan: DownloadPlan, instance: &Instance) -> BatchReport {
        let _guard = self.running.lock().await;

        let batch_id = plan.batch_id.clone();
        let action = plan.action;
        let items = plan.into_items();
        let total = items.len();

        tracing::info!(
            "Starting {} batch {} with {} item(s) on {}",
            action.as_str(),
            batch_id,
            total,
            instance
        );
        self.progress.send_replace(Some(BatchProgress::new(total)));

        let mut statuses = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            self.progress.send_modify(|progress| {
                if let Some(progress) = progress {
                    progress.current = index + 1;
                    progress.current_name = item.name.clone();
                }
            });

            match self.run_item(&item, instance).await {
                Ok(()) => {
                    tracing::info!("[{}/{}] {} done", index + 1, total, item.name);
                    statuses.push((item.name, ItemStatus::Completed));
                }
                Err(e) => {
                    let message = describe(&e, "Failed");
                    tracing::error!("[{}/{}] {} failed: {}", index + 1, total, item.name, message);
                    failures.push(format!("{}: {}", item.name, message));
                    self.progress.send_modify(|progress| {
                        if let Some(progress) = progress {
                            progress.failed += 1;
                        }
                    });
                    statuses.push((item.name, ItemStatus::Failed));
                }
            }
        }

        self.progress.send_replace(None);
        tracing::info!(
            "Batch {} complete: {} ok, {} failed",
            batch_id,
            total - failures.len(),
            failures.len()
        );

        BatchReport {
            batch_id,
            action,
            items: statuses,
            failures,
        }
    }

    async fn run_item(&self, item: &PlanItem, instance: &Instance) -> anyhow::Result<()> {
        match &item.action {
            PlanAction::Install { mod_id, file_id } => {
                self.backend
                    .install_mod_file(*mod_id, *file_id, instance)
                    .await
            }
            PlanAction::Uninstall { local_id } => {
                self.backend.uninstall_mod(local_id, instance).await
            }
        }
    }
}
