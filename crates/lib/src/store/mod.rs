//! The path-addressed state store.
//!
//! [`PathStore`] owns a single [`Doc`] and exposes four core operations:
//!
//! - [`read`](PathStore::read) a value at a dotted path
//! - [`update`](PathStore::update) a value at a dotted path through an updater
//! - [`observe`](PathStore::observe) an exact path with an [`Observer`]
//! - [`unobserve`](PathStore::unobserve) a previously registered observer
//!
//! Every successful update synchronously notifies the observers of exactly
//! that path, in registration order, before `update` returns. Ancestor and
//! descendant paths are not notified.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use pathstore::{Doc, PathStore, Value, store::Observer};
//!
//! let store = PathStore::new(
//!     Doc::new().with_doc("drink", Doc::new().with_bool("beer", true).with_text("kind", "guiness")),
//! );
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let log = Arc::clone(&seen);
//! let observer = Observer::new(move |new, old, path| {
//!     log.lock().unwrap().push((new.clone(), old.cloned(), path.to_string()));
//! });
//! store.observe("drink.kind", &observer);
//!
//! store.update("drink.kind", |_| Value::from("old speckled hen"));
//! assert_eq!(store.read("drink.kind"), Some(Value::from("old speckled hen")));
//!
//! let seen = seen.lock().unwrap();
//! assert_eq!(seen.len(), 1);
//! assert_eq!(seen[0].1, Some(Value::from("guiness")));
//! assert_eq!(seen[0].2, "drink.kind");
//! ```
//!
//! # Re-entrancy
//!
//! No lock is held while user code runs, so updaters and observers may read,
//! update, observe and unobserve freely. Observers that keep a handle to the
//! store should hold a [`WeakPathStore`] to avoid a reference cycle through the
//! registry. Chained updates to the same path recurse without limit unless
//! [`StoreConfig::max_update_depth`] is set.

use std::{
    any::Any,
    cell::RefCell,
    collections::HashMap,
    convert::Infallible,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Result,
    doc::{Doc, DocError, TypedPath, Value},
};

pub mod binding;
pub mod config;
pub mod errors;
pub mod observer;

pub use binding::Binding;
pub use config::{DispatchPolicy, StoreConfig};
pub use errors::StoreError;
pub use observer::Observer;

use observer::ObserverRegistry;

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// State is only ever changed by whole-value assignment, so a poisoned lock
/// still guards a consistent tree.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Internal state for PathStore
///
/// PathStore itself is just a cheap-to-clone handle wrapping Arc<StoreInner>.
struct StoreInner {
    /// The root record, exclusively owned by the store
    state: Mutex<Doc>,
    /// Observers keyed by exact path
    observers: Mutex<ObserverRegistry>,
    config: StoreConfig,
}

/// A path-addressed state container with per-path change notification.
///
/// `PathStore` is a cheap-to-clone handle; clones address the same state and
/// the same observers. The root [`Doc`] is owned by the store: reads hand out
/// clones (or run a closure under the lock) and never a reference into the
/// live tree.
#[derive(Clone)]
pub struct PathStore {
    inner: Arc<StoreInner>,
}

/// A weak handle to a [`PathStore`] that does not keep it alive.
#[derive(Clone, Debug)]
pub struct WeakPathStore {
    inner: Weak<StoreInner>,
}

thread_local! {
    /// Updates in flight on the current thread, keyed by store address.
    ///
    /// Entries are removed when they reach zero, so a reused address starts
    /// from a clean count.
    static UPDATE_DEPTH: RefCell<HashMap<usize, usize>> = RefCell::new(HashMap::new());
}

/// Counts one update on the current thread for the duration of the update,
/// including when it ends by unwinding.
struct DepthGuard {
    store: usize,
}

impl DepthGuard {
    /// Enters an update, returning the guard and the resulting depth.
    fn enter(store: usize) -> (Self, usize) {
        let depth = UPDATE_DEPTH.with_borrow_mut(|depths| {
            let depth = depths.entry(store).or_insert(0);
            *depth += 1;
            *depth
        });
        (Self { store }, depth)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let _ = UPDATE_DEPTH.try_with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(depth) = depths.get_mut(&self.store) {
                *depth -= 1;
                if *depth == 0 {
                    depths.remove(&self.store);
                }
            }
        });
    }
}

impl PathStore {
    /// Creates a store owning `initial` with the default configuration.
    pub fn new(initial: Doc) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    /// Creates a store owning `initial`.
    pub fn with_config(initial: Doc, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(initial),
                observers: Mutex::new(ObserverRegistry::default()),
                config,
            }),
        }
    }

    /// Creates a store from any serializable record.
    ///
    /// ```
    /// # use pathstore::PathStore;
    /// #[derive(serde::Serialize)]
    /// struct Food {
    ///     pasta: bool,
    ///     pizza: bool,
    /// }
    ///
    /// let store = PathStore::from_serialize(&Food { pasta: false, pizza: true })?;
    /// assert_eq!(store.read("pizza").and_then(|v| v.as_bool()), Some(true));
    /// # Ok::<(), pathstore::Error>(())
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(initial: &T) -> Result<Self> {
        Ok(Self::new(Doc::from_serialize(initial)?))
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Reads the value at `path`.
    ///
    /// Returns `None` if any segment is missing or an intermediate value is
    /// not a record. Present values are returned as-is, falsy ones included.
    pub fn read(&self, path: impl AsRef<str>) -> Option<Value> {
        let path = path.as_ref();
        let value = self.lock_state().get_path(path).cloned();
        tracing::trace!(path, found = value.is_some(), "Read path");
        value
    }

    /// Runs `f` on the value at `path` without cloning it.
    ///
    /// The store is locked while `f` runs; `f` must not call back into the
    /// store. That includes formatting it with `{:?}`, since the `Debug` impl
    /// locks the state too.
    pub fn inspect<R>(&self, path: impl AsRef<str>, f: impl FnOnce(Option<&Value>) -> R) -> R {
        f(self.lock_state().get_path(path.as_ref()))
    }

    /// Runs `f` on the whole state tree. The same locking caveat as
    /// [`inspect`](Self::inspect) applies.
    pub fn with_state<R>(&self, f: impl FnOnce(&Doc) -> R) -> R {
        f(&self.lock_state())
    }

    /// Returns a copy of the whole state tree.
    pub fn snapshot(&self) -> Doc {
        self.lock_state().clone()
    }

    /// Deserializes the whole state tree into a user-defined type.
    pub fn snapshot_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(self.with_state(|state| state.to_deserialize())?)
    }

    /// Replaces the value at `path` with the result of `updater`.
    ///
    /// `updater` receives the current value, or `None` if the target field does
    /// not exist yet. Its result is assigned in place and then passed, with the
    /// previous value, to every observer of `path`.
    ///
    /// Returns `false` without calling `updater` or any observer when no
    /// record holds the target field (a missing or non-record segment before
    /// the last). Such writes are skipped, not errors.
    pub fn update<F>(&self, path: impl AsRef<str>, updater: F) -> bool
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        match self.try_update(path, |old| Ok::<_, Infallible>(updater(old))) {
            Ok(applied) => applied,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`update`](Self::update).
    ///
    /// If `updater` returns an error it is handed back unchanged; nothing is
    /// assigned and no observer runs.
    pub fn try_update<F, E>(&self, path: impl AsRef<str>, updater: F) -> std::result::Result<bool, E>
    where
        F: FnOnce(Option<&Value>) -> std::result::Result<Value, E>,
    {
        let path = path.as_ref();
        let Some(_guard) = self.enter_update(path) else {
            return Ok(false);
        };

        // Pre-mutation value, also what observers receive as the old value
        let old = {
            let state = self.lock_state();
            match state.parent(path) {
                Some((container, key)) => container.get(key).cloned(),
                None => {
                    tracing::debug!(path, "Skipping update: no record holds the target field");
                    return Ok(false);
                }
            }
        };

        let new = updater(old.as_ref())?;

        // Taken after the updater so observers it registered are included
        let observers = self.lock_observers().snapshot(path);
        let Some(observers) = observers else {
            let applied = self.assign(path, new);
            tracing::trace!(path, applied, "Applied update without observers");
            return Ok(applied);
        };

        if !self.assign(path, new.clone()) {
            return Ok(false);
        }
        tracing::trace!(path, observers = observers.len(), "Applied update");
        self.dispatch(&observers, &new, old.as_ref(), path);
        Ok(true)
    }

    /// Replaces the value at `path` with `value`.
    pub fn set(&self, path: impl AsRef<str>, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.update(path, move |_| value)
    }

    /// Registers `observer` for changes to exactly `path`.
    ///
    /// Observers run in registration order. Registering the same observer
    /// twice makes it run twice per update.
    pub fn observe(&self, path: impl AsRef<str>, observer: &Observer) {
        let path = path.as_ref();
        self.lock_observers().add(path, observer.clone());
        tracing::debug!(path, "Registered observer");
    }

    /// Wraps `callback` in an [`Observer`], registers it for `path`, and
    /// returns the handle needed to unregister it.
    pub fn subscribe<F>(&self, path: impl AsRef<str>, callback: F) -> Observer
    where
        F: Fn(&Value, Option<&Value>, &str) + Send + Sync + 'static,
    {
        let observer = Observer::new(callback);
        self.observe(path, &observer);
        observer
    }

    /// Unregisters every registration of `observer` for `path`.
    ///
    /// Other observers and other paths are unaffected. A dispatch already in
    /// progress for `path` still runs the observer.
    pub fn unobserve(&self, path: impl AsRef<str>, observer: &Observer) {
        let path = path.as_ref();
        let removed = self.lock_observers().remove(path, observer);
        tracing::debug!(path, removed, "Unregistered observer");
    }

    /// Returns how many registrations exist for `path`.
    pub fn observer_count(&self, path: impl AsRef<str>) -> usize {
        self.lock_observers().count(path.as_ref())
    }

    /// Returns every path with at least one registered observer.
    pub fn observed_paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.lock_observers().paths().cloned().collect();
        paths.sort();
        paths
    }

    /// Reads through a typed path, returning `None` if the value is missing or
    /// of another type.
    pub fn get<V>(&self, path: TypedPath<V>) -> Option<V>
    where
        V: for<'a> TryFrom<&'a Value, Error = DocError>,
    {
        self.inspect(path, |value| V::try_from(value?).ok())
    }

    /// Writes through a typed path.
    pub fn put<V: Into<Value>>(&self, path: TypedPath<V>, value: V) -> bool {
        self.set(path, value)
    }

    /// Updates through a typed path.
    ///
    /// The updater receives `None` when the current value is missing or of
    /// another type.
    pub fn update_as<V, F>(&self, path: TypedPath<V>, updater: F) -> bool
    where
        V: for<'a> TryFrom<&'a Value, Error = DocError> + Into<Value>,
        F: FnOnce(Option<V>) -> V,
    {
        self.update(path, |old| {
            updater(old.and_then(|value| V::try_from(value).ok())).into()
        })
    }

    /// Binds to `path`, caching its latest value until the binding is dropped.
    pub fn bind(&self, path: impl Into<String>) -> Binding {
        Binding::new(self.clone(), path.into(), None)
    }

    /// Like [`bind`](Self::bind), also calling `on_change` with every new value.
    pub fn bind_with<F>(&self, path: impl Into<String>, on_change: F) -> Binding
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Binding::new(self.clone(), path.into(), Some(Arc::new(on_change)))
    }

    /// Downgrade to a weak reference.
    ///
    /// Observers that need to reach the store should capture the weak handle;
    /// a strong one would keep the store alive through its own registry.
    pub fn downgrade(&self) -> WeakPathStore {
        WeakPathStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, Doc> {
        lock(&self.inner.state)
    }

    fn lock_observers(&self) -> MutexGuard<'_, ObserverRegistry> {
        lock(&self.inner.observers)
    }

    /// Counts nesting per thread, so updates running concurrently on other
    /// threads never count against the limit.
    fn enter_update(&self, path: &str) -> Option<DepthGuard> {
        let (guard, depth) = DepthGuard::enter(Arc::as_ptr(&self.inner) as usize);
        if let Some(max) = self.inner.config.max_update_depth {
            // The outermost update is depth 1
            if depth - 1 > max {
                tracing::warn!(path, depth, max, "Skipping update: re-entrant depth limit reached");
                return None;
            }
        }
        Some(guard)
    }

    /// Assigns `value` at `path`, re-resolving the container since the
    /// updater may have changed the tree.
    fn assign(&self, path: &str, value: Value) -> bool {
        let mut state = self.lock_state();
        match state.parent_mut(path) {
            Some((container, key)) => {
                container.set(key, value);
                true
            }
            None => {
                tracing::debug!(path, "Skipping update: target record was removed by the updater");
                false
            }
        }
    }

    fn dispatch(&self, observers: &[Observer], new: &Value, old: Option<&Value>, path: &str) {
        match self.inner.config.dispatch {
            DispatchPolicy::Propagate => {
                for observer in observers {
                    observer.notify(new, old, path);
                }
            }
            DispatchPolicy::Isolate => {
                for (index, observer) in observers.iter().enumerate() {
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| observer.notify(new, old, path)));
                    if let Err(payload) = outcome {
                        tracing::error!(
                            path,
                            observer = index,
                            "Observer panicked: {}",
                            panic_message(&*payload)
                        );
                        // Continue executing other observers even if one fails
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

impl fmt::Debug for PathStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathStore")
            .field("state", &format!("<{} top-level fields>", self.lock_state().len()))
            .field(
                "observers",
                &format!("<{} observed paths>", self.lock_observers().paths().count()),
            )
            .field("config", &self.inner.config)
            .finish()
    }
}

impl WeakPathStore {
    /// Upgrade to a strong reference.
    ///
    /// Returns `None` if every strong handle has been dropped.
    pub fn upgrade(&self) -> Option<PathStore> {
        self.inner.upgrade().map(|inner| PathStore { inner })
    }
}
