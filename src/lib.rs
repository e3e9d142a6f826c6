//! # SensorSync - instrument metadata enrichment
//!
//! Users enter a short reference such as `sms:1234` into a questionnaire
//! field. SensorSync looks the reference up in the matching scientific
//! instrument registry and fills sibling attributes of the record with the
//! metadata it finds.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface
//! - [`core`] - Path mapping, binding index, value synchronization and the
//!   orchestrator
//! - [`adapters`] - HTTP fetching, backend handlers, value stores
//! - [`domain`] - References, values and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sensorsync::adapters::handlers::HandlerRegistry;
//! use sensorsync::adapters::http::HttpFetcher;
//! use sensorsync::adapters::store::InMemoryValueStore;
//! use sensorsync::config::load_config;
//! use sensorsync::core::binding::{BindingIndex, SharedBindingIndex};
//! use sensorsync::core::{Orchestrator, SyncReport};
//! use sensorsync::domain::PersistedReference;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sensorsync.toml")?;
//!     let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
//!     let index = BindingIndex::build(&config.handlers, &HandlerRegistry::builtin(), fetcher);
//!
//!     let store = Arc::new(InMemoryValueStore::new());
//!     let orchestrator = Orchestrator::new(Arc::new(SharedBindingIndex::new(index)), store);
//!
//!     let report = orchestrator
//!         .on_reference_persisted(&PersistedReference {
//!             reference: "gfzgipp:4711".into(),
//!             catalog_uri: "https://rdmo.example.org/terms/questions/sensors".into(),
//!             trigger_attribute_uri: "https://rdmo.example.org/terms/domain/project/sensor/id".into(),
//!             project_id: 1,
//!             set_index: 0,
//!         })
//!         .await;
//!
//!     if let SyncReport::Synchronized { summary, .. } = report {
//!         println!("{} row(s) written", summary.writes());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible library calls return [`domain::Result`]. The host entry point
//! [`core::Orchestrator::on_reference_persisted`] never fails: it returns a
//! [`core::SyncReport`] and logs what went wrong.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
