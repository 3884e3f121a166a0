// Common model types

use serde::{Deserialize, Serialize};

/// Generic paginated response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.page_items.is_empty()
    }
}

/// Result of a delete call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record existed and was removed
    Deleted,
    /// Nothing to delete
    Absent,
}

impl DeleteOutcome {
    /// Both outcomes leave the registry without the record
    pub fn is_success(&self) -> bool {
        true
    }

    pub fn was_present(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}
