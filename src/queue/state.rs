//! Batch progress tracking

/// Final status of one plan item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Completed,
    Failed,
}

/// Progress of the running batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based index of the in-flight item, 0 before the first starts
    pub current: usize,
    pub total: usize,
    /// Name of the in-flight item
    pub current_name: String,
    pub failed: usize,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}
