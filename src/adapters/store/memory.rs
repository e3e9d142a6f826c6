//! In-memory value store

use super::traits::ValueStore;
use crate::domain::{
    Result, SchemaCounts, StoredValue, SyncError, UpsertKey, UpsertOutcome,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// One schema declaration, as read from a schema file
///
/// ```json
/// [
///   {"catalog_uri": "https://rdmo.example.org/catalogs/sensors",
///    "attribute_uri": "https://rdmo.example.org/domain/sensor/parameter",
///    "collection_fields": 1}
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    pub catalog_uri: String,
    pub attribute_uri: String,
    #[serde(flatten)]
    pub counts: SchemaCounts,
}

/// [`ValueStore`] keeping rows and schema counts in process memory
///
/// Undeclared attributes report zero collection fields and zero repeating
/// groups. Used by the CLI, by embedders without a database, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryValueStore {
    schema: HashMap<(String, String), SchemaCounts>,
    rows: Mutex<Vec<StoredValue>>,
}

impl InMemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with schema declarations; later duplicates win
    pub fn with_schema(declarations: impl IntoIterator<Item = SchemaDeclaration>) -> Self {
        let mut store = Self::new();
        for declaration in declarations {
            store.declare(
                declaration.catalog_uri,
                declaration.attribute_uri,
                declaration.counts,
            );
        }
        store
    }

    /// Declares how an attribute appears in a catalog
    pub fn declare(
        &mut self,
        catalog_uri: impl Into<String>,
        attribute_uri: impl Into<String>,
        counts: SchemaCounts,
    ) {
        self.schema
            .insert((catalog_uri.into(), attribute_uri.into()), counts);
    }

    /// Snapshot of all rows in insertion order
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if a writer panicked while holding the lock.
    pub fn rows(&self) -> Result<Vec<StoredValue>> {
        Ok(self.lock()?.clone())
    }

    /// Seeds a row as the host would have stored it
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if a writer panicked while holding the lock.
    pub fn insert_row(&self, row: StoredValue) -> Result<()> {
        self.lock()?.push(row);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredValue>>> {
        self.rows
            .lock()
            .map_err(|e| SyncError::Store(format!("row lock poisoned: {e}")))
    }
}

#[async_trait]
impl ValueStore for InMemoryValueStore {
    async fn schema_counts(
        &self,
        catalog_uri: &str,
        attribute_uri: &str,
    ) -> Result<SchemaCounts> {
        Ok(self
            .schema
            .get(&(catalog_uri.to_string(), attribute_uri.to_string()))
            .copied()
            .unwrap_or_default())
    }

    async fn upsert(&self, key: &UpsertKey, text: &str) -> Result<UpsertOutcome> {
        let mut rows = self.lock()?;
        let now = Utc::now();

        if let Some(row) = rows.iter_mut().find(|row| key.matches(row)) {
            if row.text == text {
                return Ok(UpsertOutcome::Unchanged);
            }
            row.text = text.to_string();
            row.updated = now;
            return Ok(UpsertOutcome::Updated);
        }

        rows.push(StoredValue::from_key(key, text.to_string(), now));
        Ok(UpsertOutcome::Created)
    }
}
