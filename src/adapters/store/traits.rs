//! Value store abstraction
//!
//! The host owns the attribute store and the questionnaire schema. The engine
//! only needs two things from it: how an attribute is declared in a catalog,
//! and an idempotent upsert.

use crate::domain::{Result, SchemaCounts, UpsertKey, UpsertOutcome};
use async_trait::async_trait;

/// Store capability used by the value synchronizer
#[async_trait]
pub trait ValueStore: Send + Sync {
    /// Counts the collection fields and repeating groups of `catalog_uri`
    /// that are bound to `attribute_uri`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SyncError::Store`] if the schema cannot be read.
    async fn schema_counts(&self, catalog_uri: &str, attribute_uri: &str)
        -> Result<SchemaCounts>;

    /// Writes `text` at `key`
    ///
    /// Looks up a row by the fields `key` names. A match with equal text is
    /// left alone, a match with different text is updated, no match inserts
    /// a fresh row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SyncError::Store`] if the write is rejected.
    async fn upsert(&self, key: &UpsertKey, text: &str) -> Result<UpsertOutcome>;
}
