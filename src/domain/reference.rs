//! External reference parsing
//!
//! A reference is the string a user stores in a field to point at an entity
//! in a backend, in the form `<id_prefix>:<external_id>`.

use super::errors::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the backend prefix and the backend-side identifier
pub const REFERENCE_SEPARATOR: char = ':';

/// A parsed `prefix:id` reference
///
/// # Examples
///
/// ```
/// use sensorsync::domain::ExternalReference;
/// use std::str::FromStr;
///
/// let reference = ExternalReference::from_str("o2aregistry:1234").unwrap();
/// assert_eq!(reference.id_prefix(), "o2aregistry");
/// assert_eq!(reference.external_id(), "1234");
///
/// assert!(ExternalReference::from_str("a:b:c").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    id_prefix: String,
    external_id: String,
}

impl ExternalReference {
    /// Parses a reference string
    ///
    /// Exactly one separator is required and neither side may be empty.
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        let mut parts = raw.split(REFERENCE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(id), None) if !prefix.is_empty() && !id.is_empty() => Ok(Self {
                id_prefix: prefix.to_string(),
                external_id: id.to_string(),
            }),
            _ => Err(SyncError::Parse(format!(
                "reference '{raw}' is not of the form <id_prefix>:<external_id>"
            ))),
        }
    }

    /// Backend prefix used to select a binding
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    /// Identifier understood by the backend
    pub fn external_id(&self) -> &str {
        &self.external_id
    }
}

impl fmt::Display for ExternalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.id_prefix, REFERENCE_SEPARATOR, self.external_id)
    }
}

impl FromStr for ExternalReference {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
