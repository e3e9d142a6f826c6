//! Sync command implementation
//!
//! Runs the orchestrator end to end against an [`InMemoryValueStore`] and
//! prints the report and the resulting rows. Useful to check a mapping
//! against a live backend before wiring it into the host.

use super::load_index;
use crate::adapters::store::{InMemoryValueStore, SchemaDeclaration};
use crate::core::binding::SharedBindingIndex;
use crate::core::{Orchestrator, SyncReport};
use crate::domain::PersistedReference;
use anyhow::Context;
use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Catalog uri of the project
    #[arg(long)]
    pub catalog: String,

    /// Attribute uri holding the reference
    #[arg(long)]
    pub attribute: String,

    /// Project the record belongs to
    #[arg(long, default_value_t = 1)]
    pub project_id: i64,

    /// Set index of the record
    #[arg(long, default_value_t = 0)]
    pub set_index: i64,

    /// JSON file of schema declarations for list-valued attributes
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Reference in `prefix:id` form
    pub reference: String,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let declarations = match &self.schema {
            Some(path) => read_schema(path)?,
            None => Vec::new(),
        };

        let (_, index) = match load_index(config_path) {
            Ok(loaded) => loaded,
            Err(code) => return Ok(code),
        };

        let store = Arc::new(InMemoryValueStore::with_schema(declarations));
        let orchestrator = Orchestrator::new(Arc::new(SharedBindingIndex::new(index)), store.clone());

        let report = orchestrator
            .on_reference_persisted(&PersistedReference {
                reference: self.reference.clone(),
                catalog_uri: self.catalog.clone(),
                trigger_attribute_uri: self.attribute.clone(),
                project_id: self.project_id,
                set_index: self.set_index,
            })
            .await;

        let output = json!({
            "report": &report,
            "rows": store.rows()?,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(match report {
            SyncReport::Synchronized { .. } => 0,
            SyncReport::NotApplicable { .. } | SyncReport::NoMatchingBinding { .. } => 1,
            SyncReport::HandlerErrors { .. } => 4,
        })
    }
}

fn read_schema(path: &Path) -> anyhow::Result<Vec<SchemaDeclaration>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse schema file {}", path.display()))
}
