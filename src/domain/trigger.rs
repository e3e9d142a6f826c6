//! Host trigger types
//!
//! The host calls the engine once a record holding a reference has been
//! durably saved. These types describe that event and the slice of it the
//! value synchronizer needs.

use serde::{Deserialize, Serialize};

/// A reference that the host has just persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedReference {
    /// Raw `prefix:id` string as entered by the user
    pub reference: String,

    /// Catalog of the project the record belongs to
    pub catalog_uri: String,

    /// Attribute of the record that holds the reference
    pub trigger_attribute_uri: String,

    /// Project the record belongs to
    pub project_id: i64,

    /// Set index of the record
    pub set_index: i64,
}

impl PersistedReference {
    /// Context handed to the value synchronizer
    pub fn trigger_context(&self) -> TriggerContext {
        TriggerContext {
            project_id: self.project_id,
            catalog_uri: self.catalog_uri.clone(),
            set_index: self.set_index,
        }
    }
}

/// Where mapped values are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub project_id: i64,
    pub catalog_uri: String,
    pub set_index: i64,
}
