//! CLI command implementations

pub mod init;
pub mod resolve;
pub mod sync;
pub mod validate;

use crate::adapters::handlers::HandlerRegistry;
use crate::adapters::http::HttpFetcher;
use crate::config::{load_config, SensorSyncConfig};
use crate::core::binding::BindingIndex;
use std::sync::Arc;

/// Loads the configuration and builds the binding index
///
/// Prints the failure and returns the configuration error exit code when
/// either step fails.
pub(crate) fn load_index(config_path: &str) -> Result<(SensorSyncConfig, BindingIndex), i32> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("❌ Failed to load configuration file {config_path}");
            println!("   Error: {e}");
            return Err(2);
        }
    };

    let fetcher = match HttpFetcher::new(&config.http) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            println!("❌ Failed to set up HTTP client");
            println!("   Error: {e}");
            return Err(2);
        }
    };

    let index = BindingIndex::build(&config.handlers, &HandlerRegistry::builtin(), fetcher);
    Ok((config, index))
}
