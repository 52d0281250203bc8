use std::sync::Arc;

use parking_lot::RwLock;

use fwscope_types::{FirewallLog, LogFilters};

use crate::protocol::WorkerRequest;

/// The batch currently on display, shared with whoever renders it
///
/// Only ever replaced wholesale with a processed batch from the worker.
#[derive(Clone)]
pub struct LogView {
    /// Displayed records, newest first
    logs: Arc<RwLock<Vec<FirewallLog>>>,

    /// Display limit sent with every request
    limit: usize,
}

impl LogView {
    /// Create an empty view with the given display limit
    pub fn new(limit: usize) -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::new())),
            limit,
        }
    }

    /// Build a worker request merging `new_logs` into a copy of the current batch
    pub fn request(&self, new_logs: Vec<FirewallLog>, filters: &LogFilters) -> WorkerRequest {
        WorkerRequest::process_logs(new_logs, self.all(), filters.clone(), self.limit)
    }

    /// Swap in a processed batch
    pub fn replace(&self, logs: Vec<FirewallLog>) {
        *self.logs.write() = logs;
    }

    /// Get all records (cloned for rendering)
    pub fn all(&self) -> Vec<FirewallLog> {
        self.logs.read().clone()
    }

    /// Count records per action
    pub fn action_counts(&self) -> ActionCounts {
        ActionCounts::from_logs(self.logs.read().iter())
    }

    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }
}

/// Counts per action
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub pass: usize,
    pub block: usize,
    pub other: usize,
}

impl ActionCounts {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a FirewallLog>) -> Self {
        let mut counts = Self::default();

        for log in logs {
            match log.action.as_deref() {
                Some("pass") => counts.pass += 1,
                Some("block") => counts.block += 1,
                _ => counts.other += 1,
            }
        }

        counts
    }

    pub fn total(&self) -> usize {
        self.pass + self.block + self.other
    }
}
