//! External system integrations for SensorSync.
//!
//! - [`http`] - JSON fetch capability over `reqwest`
//! - [`handlers`] - One integration per instrument backend kind
//! - [`store`] - Attribute value store capability and an in-memory store
//!
//! Adapters isolate external dependencies behind traits ([`http::Fetcher`],
//! [`handlers::Handler`], [`store::ValueStore`]) so the core can be tested
//! with substitutes.

pub mod handlers;
pub mod http;
pub mod store;
