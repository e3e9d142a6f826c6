//! Domain models and types for SensorSync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **References** ([`ExternalReference`]) parsed from `prefix:id` strings
//! - **Values** ([`MappedValue`], [`MappingResult`], [`StoredValue`], [`UpsertKey`])
//! - **Host trigger types** ([`PersistedReference`], [`TriggerContext`])
//! - **Error types** ([`SyncError`], [`FetchError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust
//! use sensorsync::domain::{ExternalReference, Result};
//!
//! fn example() -> Result<()> {
//!     let reference = ExternalReference::parse("sms:17")?;
//!     assert_eq!(reference.id_prefix(), "sms");
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod reference;
pub mod result;
pub mod trigger;
pub mod value;

// Re-export commonly used types for convenience
pub use errors::{FetchError, SyncError};
pub use reference::{ExternalReference, REFERENCE_SEPARATOR};
pub use result::Result;
pub use trigger::{PersistedReference, TriggerContext};
pub use value::{
    HandleOutcome, MappedValue, MappingResult, SchemaCounts, StoredValue, UpsertKey,
    UpsertOutcome,
};
