//! Observer handles and the per-path observer registry.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::Value;

/// Observer callback signature: `(new_value, old_value, path)`.
///
/// `old_value` is `None` when the field did not exist before the update.
pub type ObserverFn = dyn Fn(&Value, Option<&Value>, &str) + Send + Sync;

/// A registered change callback.
///
/// Identity, not behavior, is what `unobserve` matches on: clones of an
/// `Observer` are the same observer, while two observers built from identical
/// closures are different.
///
/// ```
/// use pathstore::store::Observer;
///
/// let a = Observer::new(|_new, _old, _path| {});
/// let b = Observer::new(|_new, _old, _path| {});
///
/// assert!(a.same_as(&a.clone()));
/// assert!(!a.same_as(&b));
/// ```
#[derive(Clone)]
pub struct Observer {
    callback: Arc<ObserverFn>,
}

impl Observer {
    /// Wraps a closure as an observer.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Value, Option<&Value>, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Returns true if both handles refer to the same observer.
    pub fn same_as(&self, other: &Observer) -> bool {
        // Data pointer only; vtable pointers are not guaranteed unique
        std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(&other.callback))
    }

    pub(crate) fn notify(&self, new: &Value, old: Option<&Value>, path: &str) {
        (self.callback)(new, old, path)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Observers keyed by exact path, in registration order.
///
/// A path key is dropped as soon as its last observer is removed, so the
/// registry never holds an empty list.
#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    by_path: HashMap<String, Vec<Observer>>,
}

impl ObserverRegistry {
    pub(crate) fn add(&mut self, path: &str, observer: Observer) {
        self.by_path
            .entry(path.to_string())
            .or_default()
            .push(observer);
    }

    /// Removes every registration of `observer` under `path`, returning how
    /// many were removed.
    pub(crate) fn remove(&mut self, path: &str, observer: &Observer) -> usize {
        let Some(observers) = self.by_path.get_mut(path) else {
            return 0;
        };
        let before = observers.len();
        observers.retain(|registered| !registered.same_as(observer));
        let removed = before - observers.len();
        if observers.is_empty() {
            self.by_path.remove(path);
        }
        removed
    }

    /// Copies the observers of `path` so dispatch can run without the
    /// registry borrowed.
    pub(crate) fn snapshot(&self, path: &str) -> Option<Vec<Observer>> {
        self.by_path.get(path).cloned()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.by_path.get(path).map_or(0, Vec::len)
    }

    pub(crate) fn paths(&self) -> impl Iterator<Item = &String> {
        self.by_path.keys()
    }
}
