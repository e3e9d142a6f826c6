//! Handler registry
//!
//! Maps configured handler names to constructors. The set of handler kinds is
//! closed at compile time; [`HandlerRegistry::register`] exists so embedders
//! and tests can add their own kinds explicitly.

use super::gfz_gipp::{self, InstrumentPoolHandler};
use super::o2a_registry::{self, O2ARegistryHandler};
use super::r#trait::{Handler, HandlerSettings};
use super::sms::{self, SensorManagementHandler};
use crate::adapters::http::Fetcher;
use crate::domain::{Result, SyncError};
use indexmap::IndexMap;
use std::sync::Arc;

/// Builds a handler instance from validated settings
pub type HandlerConstructor =
    fn(HandlerSettings, Arc<dyn Fetcher>) -> Result<Arc<dyn Handler>>;

/// Class names used for the built-in handlers by earlier deployments
const LEGACY_ALIASES: [(&str, &str); 3] = [
    ("O2ARegistrySearchHandler", o2a_registry::NAME),
    ("SensorManagementSystemHandler", sms::NAME),
    ("GeophysicalInstrumentPoolPotsdamHandler", gfz_gipp::NAME),
];

/// Name → constructor table
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    constructors: IndexMap<String, HandlerConstructor>,
    aliases: IndexMap<String, String>,
}

impl HandlerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in handler kinds
    ///
    /// The kinds also resolve under their legacy class names, for example
    /// `SensorManagementSystemHandler`.
    ///
    /// ```
    /// use sensorsync::adapters::handlers::HandlerRegistry;
    ///
    /// let registry = HandlerRegistry::builtin();
    /// assert_eq!(
    ///     registry.names(),
    ///     vec!["o2a_registry", "sensor_management_system", "gfz_gipp"]
    /// );
    /// ```
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(o2a_registry::NAME, O2ARegistryHandler::construct);
        registry.register(sms::NAME, SensorManagementHandler::construct);
        registry.register(gfz_gipp::NAME, InstrumentPoolHandler::construct);
        for (alias, name) in LEGACY_ALIASES {
            registry.register_alias(alias, name);
        }
        registry
    }

    /// Adds or replaces a constructor
    pub fn register(&mut self, name: impl Into<String>, constructor: HandlerConstructor) {
        let name = name.into();
        if self.constructors.insert(name.clone(), constructor).is_some() {
            tracing::debug!(handler = %name, "Replaced handler constructor");
        }
    }

    /// Makes `alias` resolve to whatever `name` resolves to
    pub fn register_alias(&mut self, alias: impl Into<String>, name: impl Into<String>) {
        self.aliases.insert(alias.into(), name.into());
    }

    /// Looks up a constructor by name or alias
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownHandler`] listing the registered names.
    pub fn resolve(&self, name: &str) -> Result<HandlerConstructor> {
        let canonical = self.aliases.get(name).map_or(name, String::as_str);
        self.constructors
            .get(canonical)
            .copied()
            .ok_or_else(|| SyncError::UnknownHandler {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.names())
            .field("aliases", &self.aliases)
            .finish()
    }
}
