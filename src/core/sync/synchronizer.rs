//! Storage-shape decisions and idempotent upserts

use super::summary::SyncSummary;
use crate::adapters::store::ValueStore;
use crate::domain::{
    MappedValue, MappingResult, Result, SchemaCounts, SyncError, TriggerContext, UpsertKey,
};
use std::sync::Arc;

/// Where the elements of a list value go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// One collection field: element `i` gets `collection_index = i`
    Collection,
    /// Repeating group: element `i` becomes repetition `i` nested under the
    /// triggering set
    RepeatingGroup,
}

impl ListShape {
    /// Decides the shape from schema counts
    ///
    /// Exactly one collection field and no repeating group is a collection,
    /// no collection field and at least one repeating group is a repeating
    /// group. Everything else is ambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AmbiguousSchema`] carrying both counts.
    pub fn from_counts(attribute_uri: &str, counts: SchemaCounts) -> Result<Self> {
        match (counts.collection_fields, counts.repeating_groups) {
            (1, 0) => Ok(ListShape::Collection),
            (0, groups) if groups >= 1 => Ok(ListShape::RepeatingGroup),
            (collection_fields, repeating_groups) => Err(SyncError::AmbiguousSchema {
                attribute_uri: attribute_uri.to_string(),
                collection_fields,
                repeating_groups,
            }),
        }
    }

    /// Upsert key for element `position` of the list
    pub fn key(self, ctx: &TriggerContext, attribute_uri: &str, position: i64) -> UpsertKey {
        match self {
            ListShape::Collection => UpsertKey::CollectionItem {
                project_id: ctx.project_id,
                attribute_uri: attribute_uri.to_string(),
                set_index: ctx.set_index,
                collection_index: position,
            },
            ListShape::RepeatingGroup => UpsertKey::SetInstance {
                project_id: ctx.project_id,
                attribute_uri: attribute_uri.to_string(),
                set_prefix: ctx.set_index.to_string(),
                set_index: position,
            },
        }
    }
}

/// Writes a mapping result into a [`ValueStore`]
///
/// # Example
///
/// ```
/// use sensorsync::adapters::store::InMemoryValueStore;
/// use sensorsync::core::sync::ValueSynchronizer;
/// use sensorsync::domain::{MappedValue, MappingResult, TriggerContext};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = Arc::new(InMemoryValueStore::new());
/// let synchronizer = ValueSynchronizer::new(store.clone());
///
/// let ctx = TriggerContext { project_id: 1, catalog_uri: "urn:catalog".into(), set_index: 0 };
/// let mut result = MappingResult::new();
/// result.insert("attrX".into(), MappedValue::Scalar("42".into()));
///
/// let summary = synchronizer.synchronize(&ctx, &result).await;
/// assert_eq!(summary.created, 1);
/// assert_eq!(store.rows().unwrap()[0].text, "42");
/// # }
/// ```
#[derive(Clone)]
pub struct ValueSynchronizer {
    store: Arc<dyn ValueStore>,
}

impl ValueSynchronizer {
    pub fn new(store: Arc<dyn ValueStore>) -> Self {
        Self { store }
    }

    /// Reconciles every attribute of `result` into the store
    ///
    /// Null values are skipped, scalars are written at the triggering set,
    /// lists are spread according to their [`ListShape`]. A failure on one
    /// attribute is logged and counted, the remaining attributes still run.
    /// Running twice with the same input leaves the same rows.
    pub async fn synchronize(&self, ctx: &TriggerContext, result: &MappingResult) -> SyncSummary {
        let mut summary = SyncSummary::new();

        for (attribute_uri, value) in result {
            match value {
                MappedValue::Null => {
                    tracing::trace!(attribute_uri = %attribute_uri, "Null value, nothing to write");
                    summary.skipped_null += 1;
                }
                MappedValue::Scalar(text) => {
                    let key = UpsertKey::Scalar {
                        project_id: ctx.project_id,
                        attribute_uri: attribute_uri.clone(),
                        set_index: ctx.set_index,
                    };
                    self.write(&key, text, &mut summary).await;
                }
                MappedValue::List(items) => {
                    self.write_list(ctx, attribute_uri, items, &mut summary)
                        .await;
                }
            }
        }

        tracing::info!(
            project_id = ctx.project_id,
            set_index = ctx.set_index,
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            ambiguous = summary.ambiguous,
            failed = summary.failed,
            "Synchronized mapped values"
        );
        summary
    }

    async fn write_list(
        &self,
        ctx: &TriggerContext,
        attribute_uri: &str,
        items: &[String],
        summary: &mut SyncSummary,
    ) {
        let counts = match self
            .store
            .schema_counts(&ctx.catalog_uri, attribute_uri)
            .await
        {
            Ok(counts) => counts,
            Err(e) => {
                tracing::error!(attribute_uri = %attribute_uri, error = %e, "Schema lookup failed");
                summary.failed += 1;
                return;
            }
        };

        let shape = match ListShape::from_counts(attribute_uri, counts) {
            Ok(shape) => shape,
            Err(e) => {
                tracing::warn!(
                    catalog_uri = %ctx.catalog_uri,
                    attribute_uri = %attribute_uri,
                    collection_fields = counts.collection_fields,
                    repeating_groups = counts.repeating_groups,
                    error = %e,
                    "Cannot place list value, skipping attribute"
                );
                summary.ambiguous += 1;
                return;
            }
        };

        tracing::debug!(
            attribute_uri = %attribute_uri,
            shape = ?shape,
            elements = items.len(),
            "Writing list value"
        );
        for (position, text) in (0_i64..).zip(items) {
            let key = shape.key(ctx, attribute_uri, position);
            self.write(&key, text, summary).await;
        }
    }

    async fn write(&self, key: &UpsertKey, text: &str, summary: &mut SyncSummary) {
        match self.store.upsert(key, text).await {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                tracing::error!(
                    attribute_uri = %key.attribute_uri(),
                    error = %e,
                    "Upsert failed"
                );
                summary.failed += 1;
            }
        }
    }
}
