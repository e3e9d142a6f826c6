//! Configuration management for SensorSync.
//!
//! # Overview
//!
//! SensorSync uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SENSORSYNC_*` environment overrides for the ambient sections
//! - Default values for optional settings
//! - Ordered handler tables, so binding order follows the file
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`HttpConfig`] - Timeout and user agent for backend requests
//! - [`LoggingConfig`] - Logging configuration
//! - [`HandlerConfig`] - One table per handler: catalogs and backends
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [http]
//! timeout_seconds = 30
//! contact_email = "rdm@example.org"
//!
//! [[handlers.sensor_management_system.catalogs]]
//! catalog_uri = "https://rdmo.example.org/terms/questions/catalog/sensors"
//! auto_complete_field_uri = "https://rdmo.example.org/terms/domain/sensor/id"
//!
//! [handlers.sensor_management_system.catalogs.attribute_mapping]
//! "data.attributes.short_name" = "https://rdmo.example.org/terms/domain/sensor/name"
//!
//! [[handlers.sensor_management_system.backends]]
//! id_prefix = "sms"
//! base_url = "${SMS_BASE_URL}"
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use sensorsync::config::load_config;
//!
//! # fn example() {
//! match load_config("sensorsync.toml") {
//!     Ok(config) => println!("{} handler section(s)", config.handlers.len()),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, BackendConfig, CatalogBindingConfig, ConfigEntry, HandlerConfig,
    HttpConfig, LoggingConfig, SensorSyncConfig,
};
