//! Domain error types
//!
//! This module defines the error hierarchy for SensorSync. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main SensorSync error type
///
/// None of these ever cross the host boundary as a failure of the triggering
/// save: the orchestrator logs them and degrades to fewer (or no) writes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Bad or missing handler, binding or mapping definition
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Handler name not present in the registry
    #[error("Unknown handler '{name}'. Registered handlers: {known}")]
    UnknownHandler { name: String, known: String },

    /// Network or HTTP failure while talking to a backend
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A list value cannot be placed because the schema shape is unclear
    #[error(
        "Ambiguous schema for attribute {attribute_uri}: \
         {collection_fields} collection field(s), {repeating_groups} repeating group(s)"
    )]
    AmbiguousSchema {
        attribute_uri: String,
        collection_fields: usize,
        repeating_groups: usize,
    },

    /// Malformed reference or path expression
    #[error("Parse error: {0}")]
    Parse(String),

    /// Value store rejected a read or write
    #[error("Value store error: {0}")]
    Store(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Fetch-specific errors
///
/// Errors that occur when requesting a backend document. These errors don't
/// expose the HTTP client's types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, TLS failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Body was not valid JSON
    #[error("Response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// URL of the request that failed
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
