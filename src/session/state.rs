//! Confirmation state held by the session

use crate::error::BatchAction;
use crate::queue::DownloadPlan;

/// A plan awaiting the user's confirmation
#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub title: String,
    pub message: String,
    pub plan: DownloadPlan,
}

impl PendingConfirm {
    pub fn new(plan: DownloadPlan) -> Self {
        let count = plan.len();
        let noun = if count == 1 { "mod" } else { "mods" };
        let title = match plan.action {
            BatchAction::Download => format!("Download {} {}?", count, noun),
            BatchAction::Update => format!("Update {} {}?", count, noun),
            BatchAction::Delete => format!("Delete {} {}?", count, noun),
        };
        let message = plan.names().join("\n");

        Self {
            title,
            message,
            plan,
        }
    }

    pub fn action(&self) -> BatchAction {
        self.plan.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::PlanItem;

    #[test]
    fn test_confirm_text() {
        let plan = DownloadPlan::new(
            BatchAction::Delete,
            vec![
                PlanItem::uninstall("Alpha", "alpha.jar"),
                PlanItem::uninstall("Beta", "beta.jar"),
            ],
        );
        let confirm = PendingConfirm::new(plan);
        assert_eq!(confirm.title, "Delete 2 mods?");
        assert_eq!(confirm.message, "Alpha\nBeta");
        assert_eq!(confirm.action(), BatchAction::Delete);

        let single = PendingConfirm::new(DownloadPlan::new(
            BatchAction::Download,
            vec![PlanItem::install("Alpha", 1, 10)],
        ));
        assert_eq!(single.title, "Download 1 mod?");
    }
}
