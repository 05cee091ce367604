//! Store configuration.

use serde::{Deserialize, Serialize};

use super::StoreError;

/// How observer panics are handled during dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// A panicking observer unwinds out of `update`; observers registered
    /// after it do not run for that update.
    #[default]
    Propagate,
    /// Each observer runs under `catch_unwind`. A panic is logged and the
    /// remaining observers still run. This changes the observable behavior of
    /// `update` and must be opted into.
    Isolate,
}

/// Configuration for a [`PathStore`](super::PathStore).
///
/// # Example
///
/// ```
/// use pathstore::store::{DispatchPolicy, StoreConfig};
///
/// let config = StoreConfig::from_json(r#"{ "dispatch": "isolate" }"#)?;
/// assert_eq!(config.dispatch, DispatchPolicy::Isolate);
/// assert_eq!(config.max_update_depth, None);
///
/// let config = StoreConfig {
///     max_update_depth: Some(8),
///     ..Default::default()
/// };
/// assert_eq!(config.dispatch, DispatchPolicy::Propagate);
/// # Ok::<(), pathstore::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Observer failure handling.
    #[serde(default)]
    pub dispatch: DispatchPolicy,

    /// Maximum nesting of `update` calls made from inside updaters or
    /// observers. `None` leaves re-entrancy unbounded.
    ///
    /// Nesting is counted per thread and per store; concurrent updates from
    /// other threads are never limited by it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_update_depth: Option<usize>,
}

impl StoreConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            StoreError::InvalidConfig {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Builder method to set the dispatch policy
    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Builder method to bound re-entrant updates
    pub fn with_max_update_depth(mut self, depth: usize) -> Self {
        self.max_update_depth = Some(depth);
        self
    }
}
