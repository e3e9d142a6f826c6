//! Core logic for SensorSync.
//!
//! # Modules
//!
//! - [`mapping`] - Path expressions and attribute mapping
//! - [`binding`] - Which handler answers which reference
//! - [`sync`] - Storage-shape decisions and upserts
//! - [`orchestrator`] - The host entry point tying the above together
//!
//! # Workflow
//!
//! 1. **Parse**: split the saved `prefix:id` reference
//! 2. **Select**: find the binding for catalog, trigger attribute and prefix
//! 3. **Fetch**: the binding's handler assembles a composite document
//! 4. **Map**: path expressions extract attribute values
//! 5. **Synchronize**: values are upserted into the store

pub mod binding;
pub mod mapping;
pub mod orchestrator;
pub mod sync;

pub use orchestrator::{Orchestrator, SyncReport};
