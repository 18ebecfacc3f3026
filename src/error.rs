//! User-visible error types
//!
//! Backend calls propagate `anyhow::Error`; only the failures a user is
//! meant to see are turned into a `UserError`.

use thiserror::Error;

/// Kind of batch that produced aggregated failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Download,
    Update,
    Delete,
}

impl BatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Download => "download",
            BatchAction::Update => "update",
            BatchAction::Delete => "delete",
        }
    }
}

/// A dismissible error surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// A reset search failed; results were cleared
    #[error("{0}")]
    SearchFailed(String),

    /// Loading the next page failed; existing results were kept
    #[error("{0}")]
    LoadMoreFailed(String),

    /// One or more items of a batch failed; one entry per failed item
    #[error("{}", failures.join("\n"))]
    BatchFailed {
        action: BatchAction,
        failures: Vec<String>,
    },
}

impl UserError {
    pub(crate) fn search(err: &anyhow::Error) -> Self {
        UserError::SearchFailed(describe(err, "Failed to search mods"))
    }

    pub(crate) fn load_more(err: &anyhow::Error) -> Self {
        UserError::LoadMoreFailed(describe(err, "Failed to load more mods"))
    }
}

/// Message for a backend failure, falling back when the error has no text
pub(crate) fn describe(err: &anyhow::Error, fallback: &str) -> String {
    let msg = format!("{:#}", err);
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        msg
    }
}
