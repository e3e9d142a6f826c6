//! Outgoing HTTP
//!
//! Handlers never talk to `reqwest` directly. They go through the
//! [`Fetcher`] capability so tests and embedders can substitute their own
//! transport.

pub mod fetcher;

pub use fetcher::{Fetcher, HttpFetcher};
