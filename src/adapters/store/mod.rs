//! Attribute value storage
//!
//! [`ValueStore`] is the boundary to the host's attribute store.
//! [`InMemoryValueStore`] implements it without a database.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryValueStore, SchemaDeclaration};
pub use traits::ValueStore;
