//! Synchronization summary

use crate::domain::UpsertOutcome;
use serde::Serialize;

/// Counts of what one synchronize pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Rows inserted
    pub created: usize,

    /// Rows whose text changed
    pub updated: usize,

    /// Rows already holding the mapped text
    pub unchanged: usize,

    /// Attributes skipped because their value was null
    pub skipped_null: usize,

    /// List attributes skipped because their storage shape is unclear
    pub ambiguous: usize,

    /// Upserts or schema lookups rejected by the store
    pub failed: usize,
}

impl SyncSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one upsert
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Rows created or updated
    pub fn writes(&self) -> usize {
        self.created + self.updated
    }

    /// Rows touched by an upsert, whether or not they changed
    pub fn rows(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    /// Check if every attribute could be placed and written
    pub fn is_clean(&self) -> bool {
        self.ambiguous == 0 && self.failed == 0
    }
}
