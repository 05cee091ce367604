//!
//! PathStore: a keyed-state container addressed by dotted paths.
//! This library lets UI-style code read and update nested state by path and be
//! told, synchronously, when a particular path changes.
//!
//! ## Core Concepts
//!
//! * **Documents (`doc::Doc`)**: The state tree. A record of named fields, each holding a `doc::Value`. Records nest arbitrarily; lists and maps are leaves.
//! * **Paths**: Dot-separated field names such as `"drink.kind"`. Each segment descends one record. Paths are split literally with no escaping or normalization.
//! * **Stores (`store::PathStore`)**: Own a single document and expose `read`, `update`, `observe` and `unobserve`.
//! * **Observers (`store::Observer`)**: Callbacks registered for one exact path. They receive the new value, the previous value and the path after every update to that path, in registration order.
//! * **Bindings (`store::Binding`)**: Scoped subscriptions that cache a path's latest value and unregister themselves when dropped.
//! * **Typed paths (`doc::TypedPath`)**: Compile-time path constants, usually declared with [`state_paths!`], that carry the type of the value they address.

pub mod doc;
pub mod store;

/// Re-export the core document types for easier access.
pub use doc::{Doc, DocError, TypedPath, Value};
/// Re-export the store and its handles.
pub use store::{Binding, Observer, PathStore, StoreConfig, StoreError, WeakPathStore};

/// Result type used throughout the PathStore library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the PathStore library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured document errors from the doc module
    #[error(transparent)]
    Doc(doc::DocError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Doc(_) => "doc",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error is a type mismatch or a non-record root.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Doc(doc_err) => doc_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_config_error(),
            _ => false,
        }
    }

    /// Check if this error is serialization-related.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Doc(doc_err) => doc_err.is_serialization_error(),
            _ => false,
        }
    }
}
