//! Error types for document values.
//!
//! Path lookups never fail: an unresolvable path reads as `None`. These errors
//! cover the fallible edges of the value model instead, namely typed
//! conversions and the serde bridge to user-defined types.

use thiserror::Error;

/// Structured error types for [`Doc`](super::Doc) and [`Value`](super::Value) operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocError {
    /// A value could not be converted to the requested type
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A root state must be record-shaped
    #[error("Expected a record at the root of the state, found {found}")]
    NotARecord { found: String },

    /// Serializing a user type into a document failed
    #[error("Document serialization failed: {reason}")]
    SerializationFailed { reason: String },

    /// Deserializing a document into a user type failed
    #[error("Document deserialization failed: {reason}")]
    DeserializationFailed { reason: String },
}

impl DocError {
    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            DocError::TypeMismatch { .. } | DocError::NotARecord { .. }
        )
    }

    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            DocError::SerializationFailed { .. } | DocError::DeserializationFailed { .. }
        )
    }
}

impl From<DocError> for crate::Error {
    fn from(err: DocError) -> Self {
        crate::Error::Doc(err)
    }
}
