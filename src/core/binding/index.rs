//! Binding index built from the handler configuration

use crate::adapters::handlers::{Handler, HandlerRegistry, HandlerSettings};
use crate::adapters::http::Fetcher;
use crate::config::{BackendConfig, CatalogBindingConfig, ConfigEntry, HandlerConfig};
use crate::core::mapping::AttributeMapping;
use crate::domain::{Result, SyncError};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A handler instance bound to a catalog and its trigger attribute
#[derive(Clone)]
pub struct Binding {
    /// Configured handler name, e.g. `sensor_management_system`
    pub handler_name: String,
    pub catalog_uri: String,
    pub trigger_attribute_uri: String,
    pub handler: Arc<dyn Handler>,
}

impl Binding {
    pub fn id_prefix(&self) -> &str {
        self.handler.id_prefix()
    }

    /// Whether this binding answers to a reference saved on `trigger_attribute_uri`
    pub fn accepts(&self, trigger_attribute_uri: &str, id_prefix: &str) -> bool {
        self.trigger_attribute_uri == trigger_attribute_uri && self.id_prefix() == id_prefix
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("handler_name", &self.handler_name)
            .field("catalog_uri", &self.catalog_uri)
            .field("trigger_attribute_uri", &self.trigger_attribute_uri)
            .field("id_prefix", &self.id_prefix())
            .field("base_url", &self.handler.base_url())
            .finish()
    }
}

/// A configuration entry that did not make it into the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBinding {
    pub handler_name: String,
    pub catalog_uri: Option<String>,
    pub id_prefix: Option<String>,
    pub reason: String,
}

/// Catalog uri → bindings, in configuration order
///
/// Immutable once built. To pick up configuration changes build a new index
/// and publish it through [`super::SharedBindingIndex`].
#[derive(Debug, Default)]
pub struct BindingIndex {
    by_catalog: IndexMap<String, Vec<Binding>>,
    skipped: Vec<SkippedBinding>,
}

impl BindingIndex {
    /// Builds the index
    ///
    /// Walks handlers in configuration order, then their catalogs, then their
    /// backends (or a single default backend when none are declared). Every
    /// entry that cannot be turned into a working handler is logged, recorded
    /// in [`BindingIndex::skipped`] and left out. The build itself never fails.
    pub fn build(
        handlers: &IndexMap<String, HandlerConfig>,
        registry: &HandlerRegistry,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let mut index = Self::default();

        for (handler_name, handler_config) in handlers {
            let construct = match registry.resolve(handler_name) {
                Ok(construct) => construct,
                Err(e) => {
                    index.skip_handler(handler_name, handler_config, &e);
                    continue;
                }
            };

            for entry in &handler_config.catalogs {
                let catalog_uri = entry.raw_str("catalog_uri").map(str::to_string);
                let (catalog_uri, trigger_attribute_uri, mapping) =
                    match parsed_entry(handler_name, "catalog", entry)
                        .and_then(|catalog| validate_catalog(handler_name, catalog))
                    {
                        Ok(parts) => parts,
                        Err(e) => {
                            index.skip(handler_name, catalog_uri, None, &e);
                            continue;
                        }
                    };

                let default_backend = [ConfigEntry::from(BackendConfig::default())];
                let backends = if handler_config.backends.is_empty() {
                    &default_backend[..]
                } else {
                    &handler_config.backends[..]
                };

                for entry in backends {
                    let backend = match parsed_entry(handler_name, "backend", entry) {
                        Ok(backend) => backend,
                        Err(e) => {
                            index.skip(
                                handler_name,
                                Some(catalog_uri.clone()),
                                entry.raw_str("id_prefix").map(str::to_string),
                                &e,
                            );
                            continue;
                        }
                    };
                    let settings = HandlerSettings {
                        id_prefix: backend.id_prefix.clone(),
                        base_url: backend.base_url.clone(),
                        attribute_mapping: mapping.clone(),
                    };
                    match construct(settings, Arc::clone(&fetcher)) {
                        Ok(handler) => {
                            tracing::debug!(
                                handler = %handler_name,
                                catalog_uri = %catalog_uri,
                                trigger_attribute_uri = %trigger_attribute_uri,
                                id_prefix = %handler.id_prefix(),
                                "Binding registered"
                            );
                            index.push(Binding {
                                handler_name: handler_name.clone(),
                                catalog_uri: catalog_uri.clone(),
                                trigger_attribute_uri: trigger_attribute_uri.clone(),
                                handler,
                            });
                        }
                        Err(e) => index.skip(
                            handler_name,
                            Some(catalog_uri.clone()),
                            backend.id_prefix.clone(),
                            &e,
                        ),
                    }
                }
            }
        }

        tracing::info!(
            bindings = index.len(),
            catalogs = index.by_catalog.len(),
            skipped = index.skipped.len(),
            "Binding index built"
        );
        index
    }

    /// Bindings declared for a catalog, in configuration order
    pub fn lookup(&self, catalog_uri: &str) -> &[Binding] {
        self.by_catalog
            .get(catalog_uri)
            .map_or(&[], Vec::as_slice)
    }

    /// Bindings of a catalog that answer to a trigger attribute and prefix
    pub fn candidates<'s, 'q>(
        &'s self,
        catalog_uri: &str,
        trigger_attribute_uri: &'q str,
        id_prefix: &'q str,
    ) -> impl Iterator<Item = &'s Binding> + 'q
    where
        's: 'q,
    {
        self.lookup(catalog_uri)
            .iter()
            .filter(move |binding| binding.accepts(trigger_attribute_uri, id_prefix))
    }

    /// The binding to use for a reference
    ///
    /// The first candidate in configuration order wins. Further candidates are
    /// reported with a warning since they will never be consulted.
    pub fn select(
        &self,
        catalog_uri: &str,
        trigger_attribute_uri: &str,
        id_prefix: &str,
    ) -> Option<&Binding> {
        let mut candidates = self.candidates(catalog_uri, trigger_attribute_uri, id_prefix);
        let chosen = candidates.next()?;
        let shadowed = candidates.count();
        if shadowed > 0 {
            tracing::warn!(
                catalog_uri = %catalog_uri,
                trigger_attribute_uri = %trigger_attribute_uri,
                id_prefix = %id_prefix,
                chosen = %chosen.handler_name,
                shadowed,
                "Several bindings match, using the first configured"
            );
        }
        Some(chosen)
    }

    /// Entries left out during the build
    pub fn skipped(&self) -> &[SkippedBinding] {
        &self.skipped
    }

    /// Catalog uris with at least one binding
    pub fn catalogs(&self) -> impl Iterator<Item = &str> {
        self.by_catalog.keys().map(String::as_str)
    }

    /// All bindings, grouped by catalog
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.by_catalog.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_catalog.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_catalog.is_empty()
    }

    fn push(&mut self, binding: Binding) {
        self.by_catalog
            .entry(binding.catalog_uri.clone())
            .or_default()
            .push(binding);
    }

    fn skip(
        &mut self,
        handler_name: &str,
        catalog_uri: Option<String>,
        id_prefix: Option<String>,
        error: &SyncError,
    ) {
        tracing::warn!(
            handler = %handler_name,
            catalog_uri = catalog_uri.as_deref().unwrap_or("-"),
            id_prefix = id_prefix.as_deref().unwrap_or("-"),
            error = %error,
            "Skipping handler binding"
        );
        self.skipped.push(SkippedBinding {
            handler_name: handler_name.to_string(),
            catalog_uri,
            id_prefix,
            reason: error.to_string(),
        });
    }

    fn skip_handler(&mut self, handler_name: &str, config: &HandlerConfig, error: &SyncError) {
        if config.catalogs.is_empty() {
            self.skip(handler_name, None, None, error);
        }
        for entry in &config.catalogs {
            let catalog_uri = entry.raw_str("catalog_uri").map(str::to_string);
            self.skip(handler_name, catalog_uri, None, error);
        }
    }
}

fn parsed_entry<'a, T>(handler_name: &str, kind: &str, entry: &'a ConfigEntry<T>) -> Result<&'a T> {
    entry.parsed().map_err(|e| {
        SyncError::Configuration(format!("{handler_name}: malformed {kind} entry: {e}"))
    })
}

fn validate_catalog(
    handler_name: &str,
    catalog: &CatalogBindingConfig,
) -> Result<(String, String, AttributeMapping)> {
    let required = |value: &Option<String>, field: &str| -> Result<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                SyncError::Configuration(format!("{handler_name}: catalog entry is missing {field}"))
            })
    };

    let catalog_uri = required(&catalog.catalog_uri, "catalog_uri")?;
    let trigger_attribute_uri =
        required(&catalog.auto_complete_field_uri, "auto_complete_field_uri")?;
    let table = catalog.attribute_mapping.as_ref().ok_or_else(|| {
        SyncError::Configuration(format!(
            "{handler_name}: catalog '{catalog_uri}' is missing attribute_mapping"
        ))
    })?;
    let mapping = AttributeMapping::compile(table)?;

    Ok((catalog_uri, trigger_attribute_uri, mapping))
}
