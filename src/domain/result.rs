//! Result type alias for SensorSync

use super::errors::SyncError;

/// Result type alias for SensorSync operations
///
/// # Examples
///
/// ```
/// use sensorsync::domain::result::Result;
/// use sensorsync::domain::errors::SyncError;
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Parse("no separator".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
