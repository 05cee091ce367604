//! Scoped subscriptions that cache the latest value of one path.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use super::{Observer, PathStore, lock};
use crate::Value;

/// Callback run by a [`Binding`] with each new value.
pub type ChangeHook = dyn Fn(&Value) + Send + Sync;

/// A live view of one path.
///
/// Creating a binding registers an observer for its path and reads the
/// current value. Every update to the path refreshes the cached value and
/// calls the change hook, if any. Dropping the binding unregisters the
/// observer, so later updates no longer reach it.
///
/// ```
/// use pathstore::{Doc, PathStore, Value};
///
/// let store = PathStore::new(Doc::new().with_int("count", 1));
/// {
///     let count = store.bind("count");
///     assert_eq!(count.get(), Some(Value::Int(1)));
///
///     count.update(|old| Value::Int(old.and_then(Value::as_int).unwrap_or(0) + 1));
///     assert_eq!(count.get(), Some(Value::Int(2)));
///     assert_eq!(store.observer_count("count"), 1);
/// }
/// assert_eq!(store.observer_count("count"), 0);
/// ```
pub struct Binding {
    store: PathStore,
    path: String,
    current: Arc<Mutex<Option<Value>>>,
    observer: Observer,
}

impl Binding {
    pub(super) fn new(store: PathStore, path: String, on_change: Option<Arc<ChangeHook>>) -> Self {
        let current = Arc::new(Mutex::new(None));

        let cache = Arc::clone(&current);
        let observer = Observer::new(move |new, _old, _path| {
            *lock(&cache) = Some(new.clone());
            if let Some(hook) = &on_change {
                hook(new);
            }
        });

        // Observe before the initial read so no update can fall in between
        store.observe(&path, &observer);
        let initial = store.read(&path);
        *lock(&current) = initial;

        tracing::debug!(path = %path, "Created binding");
        Self {
            store,
            path,
            current,
            observer,
        }
    }

    /// Returns the latest known value at the bound path.
    pub fn get(&self) -> Option<Value> {
        lock(&self.current).clone()
    }

    /// Writes the bound path. See [`PathStore::set`].
    pub fn set(&self, value: impl Into<Value>) -> bool {
        self.store.set(&self.path, value)
    }

    /// Updates the bound path. See [`PathStore::update`].
    pub fn update<F>(&self, updater: F) -> bool
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        self.store.update(&self.path, updater)
    }

    /// The bound path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The store this binding observes.
    pub fn store(&self) -> &PathStore {
        &self.store
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.store.unobserve(&self.path, &self.observer);
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("path", &self.path)
            .field("current", &self.get())
            .finish()
    }
}
