//! Value synchronization
//!
//! Turns a [`crate::domain::MappingResult`] into rows of the attribute store.

mod summary;
mod synchronizer;

pub use summary::SyncSummary;
pub use synchronizer::{ListShape, ValueSynchronizer};
