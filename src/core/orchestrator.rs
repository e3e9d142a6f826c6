//! Host entry point
//!
//! The host calls [`Orchestrator::on_reference_persisted`] after saving a
//! record that holds a `prefix:id` reference. The orchestrator picks the
//! binding, asks its handler for metadata and writes the mapped values.
//! Nothing here returns an error to the host: enrichment is best effort and
//! must never fail the save that triggered it.

use crate::adapters::store::ValueStore;
use crate::core::binding::SharedBindingIndex;
use crate::core::sync::{SyncSummary, ValueSynchronizer};
use crate::domain::{ExternalReference, HandleOutcome, PersistedReference};
use serde::Serialize;
use std::sync::Arc;

/// What happened for one persisted reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncReport {
    /// The saved value is not a reference or lacks its context
    NotApplicable { reason: String },

    /// No binding answers to this catalog, attribute and prefix
    NoMatchingBinding {
        catalog_uri: String,
        trigger_attribute_uri: String,
        id_prefix: String,
    },

    /// The handler could not confirm the external id; nothing was written
    HandlerErrors {
        handler_name: String,
        id_prefix: String,
        errors: Vec<String>,
    },

    /// Mapped values were written
    Synchronized {
        handler_name: String,
        id_prefix: String,
        external_id: String,
        summary: SyncSummary,
    },
}

impl SyncReport {
    /// Summary of writes, if any were attempted
    pub fn summary(&self) -> Option<&SyncSummary> {
        match self {
            SyncReport::Synchronized { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

/// Wires the binding index, handlers and value synchronizer together
///
/// # Example
///
/// ```no_run
/// use sensorsync::adapters::handlers::HandlerRegistry;
/// use sensorsync::adapters::http::HttpFetcher;
/// use sensorsync::adapters::store::InMemoryValueStore;
/// use sensorsync::config::load_config;
/// use sensorsync::core::binding::{BindingIndex, SharedBindingIndex};
/// use sensorsync::core::Orchestrator;
/// use sensorsync::domain::PersistedReference;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("sensorsync.toml")?;
/// let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
/// let index = BindingIndex::build(&config.handlers, &HandlerRegistry::builtin(), fetcher);
///
/// let orchestrator = Orchestrator::new(
///     Arc::new(SharedBindingIndex::new(index)),
///     Arc::new(InMemoryValueStore::new()),
/// );
///
/// let report = orchestrator
///     .on_reference_persisted(&PersistedReference {
///         reference: "sms:42".into(),
///         catalog_uri: "https://rdmo.example.org/catalogs/sensors".into(),
///         trigger_attribute_uri: "https://rdmo.example.org/domain/sensor/id".into(),
///         project_id: 1,
///         set_index: 0,
///     })
///     .await;
/// println!("{report:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    index: Arc<SharedBindingIndex>,
    synchronizer: ValueSynchronizer,
}

impl Orchestrator {
    pub fn new(index: Arc<SharedBindingIndex>, store: Arc<dyn ValueStore>) -> Self {
        Self {
            index,
            synchronizer: ValueSynchronizer::new(store),
        }
    }

    /// The published index, for reloads
    pub fn index(&self) -> &Arc<SharedBindingIndex> {
        &self.index
    }

    /// Enriches the record the host just saved
    ///
    /// The index snapshot is pinned for the whole call, so a concurrent
    /// reload does not affect an event already in flight.
    pub async fn on_reference_persisted(&self, event: &PersistedReference) -> SyncReport {
        let reference = match ExternalReference::parse(&event.reference) {
            Ok(reference) => reference,
            Err(e) => {
                tracing::debug!(reference = %event.reference, error = %e, "Not an external reference");
                return SyncReport::NotApplicable {
                    reason: e.to_string(),
                };
            }
        };

        if event.catalog_uri.is_empty() || event.trigger_attribute_uri.is_empty() {
            tracing::warn!(reference = %reference, "Missing catalog or attribute uri");
            return SyncReport::NotApplicable {
                reason: "missing catalog or attribute uri".to_string(),
            };
        }

        let index = self.index.load();
        let Some(binding) = index.select(
            &event.catalog_uri,
            &event.trigger_attribute_uri,
            reference.id_prefix(),
        ) else {
            tracing::warn!(
                id_prefix = %reference.id_prefix(),
                catalog_uri = %event.catalog_uri,
                trigger_attribute_uri = %event.trigger_attribute_uri,
                "No matching binding"
            );
            return SyncReport::NoMatchingBinding {
                catalog_uri: event.catalog_uri.clone(),
                trigger_attribute_uri: event.trigger_attribute_uri.clone(),
                id_prefix: reference.id_prefix().to_string(),
            };
        };

        tracing::info!(
            handler = %binding.handler_name,
            reference = %reference,
            project_id = event.project_id,
            "Resolving external reference"
        );

        match binding.handler.handle(reference.external_id()).await {
            HandleOutcome::Errors(errors) => {
                tracing::error!(
                    handler = %binding.handler_name,
                    id_prefix = %reference.id_prefix(),
                    errors = ?errors,
                    "Handler returned errors"
                );
                SyncReport::HandlerErrors {
                    handler_name: binding.handler_name.clone(),
                    id_prefix: reference.id_prefix().to_string(),
                    errors,
                }
            }
            HandleOutcome::Mapped(result) => {
                let summary = self
                    .synchronizer
                    .synchronize(&event.trigger_context(), &result)
                    .await;
                SyncReport::Synchronized {
                    handler_name: binding.handler_name.clone(),
                    id_prefix: reference.id_prefix().to_string(),
                    external_id: reference.external_id().to_string(),
                    summary,
                }
            }
        }
    }
}
