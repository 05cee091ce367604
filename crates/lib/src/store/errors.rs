//! Error types for store operations.
//!
//! Reads and writes never fail: an unresolvable path reads as `None` and an
//! unresolvable write is skipped. Errors here cover store setup only.

use thiserror::Error;

/// Structured error types for store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A store configuration could not be parsed
    #[error("Invalid store configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl StoreError {
    /// Check if this error is related to configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, StoreError::InvalidConfig { .. })
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
