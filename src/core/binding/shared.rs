//! Copy-and-swap publication of the binding index

use super::index::BindingIndex;
use crate::adapters::handlers::HandlerRegistry;
use crate::adapters::http::Fetcher;
use crate::config::HandlerConfig;
use arc_swap::ArcSwap;
use indexmap::IndexMap;
use std::sync::Arc;

/// Current [`BindingIndex`], replaceable while readers are active
///
/// Readers pin a snapshot with [`SharedBindingIndex::load`] and keep using it
/// for the whole event even if a reload publishes a new index meanwhile.
#[derive(Debug)]
pub struct SharedBindingIndex {
    current: ArcSwap<BindingIndex>,
}

impl SharedBindingIndex {
    pub fn new(index: BindingIndex) -> Self {
        Self {
            current: ArcSwap::from_pointee(index),
        }
    }

    /// Pins the current snapshot
    pub fn load(&self) -> Arc<BindingIndex> {
        self.current.load_full()
    }

    /// Publishes `index` and returns the snapshot it replaced
    pub fn replace(&self, index: BindingIndex) -> Arc<BindingIndex> {
        self.current.swap(Arc::new(index))
    }

    /// Builds a fresh index and publishes it
    pub fn rebuild(
        &self,
        handlers: &IndexMap<String, HandlerConfig>,
        registry: &HandlerRegistry,
        fetcher: Arc<dyn Fetcher>,
    ) -> Arc<BindingIndex> {
        let index = BindingIndex::build(handlers, registry, fetcher);
        tracing::info!(bindings = index.len(), "Publishing rebuilt binding index");
        self.replace(index)
    }
}

impl Default for SharedBindingIndex {
    fn default() -> Self {
        Self::new(BindingIndex::default())
    }
}
