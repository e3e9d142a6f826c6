//! Resolve command implementation
//!
//! Runs binding selection and the handler for one reference and prints the
//! mapped attribute values. Nothing is written.

use super::load_index;
use crate::domain::{ExternalReference, HandleOutcome};
use clap::Args;
use serde_json::json;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Catalog uri of the project
    #[arg(long)]
    pub catalog: String,

    /// Attribute uri holding the reference
    #[arg(long)]
    pub attribute: String,

    /// Reference in `prefix:id` form
    pub reference: String,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let reference = match ExternalReference::parse(&self.reference) {
            Ok(reference) => reference,
            Err(e) => {
                println!("❌ {e}");
                return Ok(1);
            }
        };

        let (_, index) = match load_index(config_path) {
            Ok(loaded) => loaded,
            Err(code) => return Ok(code),
        };

        let Some(binding) = index.select(&self.catalog, &self.attribute, reference.id_prefix())
        else {
            println!(
                "❌ No binding for prefix '{}' on {} in {}",
                reference.id_prefix(),
                self.attribute,
                self.catalog
            );
            return Ok(1);
        };

        tracing::info!(handler = %binding.handler_name, reference = %reference, "Resolving");

        match binding.handler.handle(reference.external_id()).await {
            HandleOutcome::Mapped(values) => {
                let output = json!({
                    "handler": binding.handler_name,
                    "id_prefix": reference.id_prefix(),
                    "external_id": reference.external_id(),
                    "values": values,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(0)
            }
            HandleOutcome::Errors(errors) => {
                println!("❌ {} could not resolve {reference}", binding.handler_name);
                for error in errors {
                    println!("   Error: {error}");
                }
                Ok(4)
            }
        }
    }
}
