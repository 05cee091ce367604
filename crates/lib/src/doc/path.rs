//! Dotted paths into a state document.
//!
//! A path is a plain string of segments joined by `.`, for example
//! `"user.settings.theme"`. Paths are never normalized: `"a..b"` has an empty
//! middle segment and `""` is a single empty segment. Two paths are the same
//! exactly when their strings are equal, which is also how observers are keyed.
//!
//! # Typed paths
//!
//! Runtime paths are best-effort; a typo simply reads as `None`. The
//! [`state_paths!`](crate::state_paths) macro layers compile-time checking on
//! top by declaring one [`TypedPath`] constant per field of a state shape:
//!
//! ```
//! use pathstore::{Doc, PathStore, Value, state_paths};
//!
//! state_paths! {
//!     pub mod app {
//!         user {
//!             name: String,
//!             settings {
//!                 theme: String,
//!             },
//!         },
//!         tags: Vec<Value>,
//!     }
//! }
//!
//! fn main() {
//!     assert_eq!(app::user::settings::theme.as_str(), "user.settings.theme");
//!     assert_eq!(app::user.as_str(), "user");
//!
//!     let store = PathStore::new(
//!         Doc::new().with_doc("user", Doc::new().with_text("name", "Alice")),
//!     );
//!     assert_eq!(store.get(app::user::name), Some("Alice".to_string()));
//! }
//! ```
//!
//! Collections (`Vec<Value>`, maps) are declared as leaves, so there is no way
//! to name a path that descends into one.

use std::{fmt, marker::PhantomData};

/// Path segment separator.
pub const SEPARATOR: char = '.';

/// Splits a path into its segments.
///
/// Always yields at least one segment.
pub fn segments(path: &str) -> std::str::Split<'_, char> {
    path.split(SEPARATOR)
}

/// Splits a path into the parent path and the final segment.
///
/// Returns `None` as the parent for single-segment paths.
///
/// ```
/// # use pathstore::doc::path::split_last;
/// assert_eq!(split_last("drink.kind"), (Some("drink"), "kind"));
/// assert_eq!(split_last("a.b.c"), (Some("a.b"), "c"));
/// assert_eq!(split_last("animals"), (None, "animals"));
/// ```
pub fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once(SEPARATOR) {
        Some((parent, last)) => (Some(parent), last),
        None => (None, path),
    }
}

/// A statically known path whose target is expected to hold a `V`.
///
/// The type parameter is only a promise made by whoever declared the path,
/// usually the [`state_paths!`](crate::state_paths) macro. Reads through a
/// `TypedPath` still use runtime traversal and return `None` on mismatch.
pub struct TypedPath<V> {
    path: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> TypedPath<V> {
    /// Declares a typed path.
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            _value: PhantomData,
        }
    }

    /// Returns the path as a string slice.
    pub const fn as_str(&self) -> &'static str {
        self.path
    }
}

// Manual impls so that `V` needs no bounds.
impl<V> Clone for TypedPath<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for TypedPath<V> {}

impl<V> PartialEq for TypedPath<V> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<V> Eq for TypedPath<V> {}

impl<V> fmt::Debug for TypedPath<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedPath").field(&self.path).finish()
    }
}

impl<V> fmt::Display for TypedPath<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl<V> AsRef<str> for TypedPath<V> {
    fn as_ref(&self) -> &str {
        self.path
    }
}

/// Declares a module tree of [`TypedPath`] constants mirroring a state shape.
///
/// Every field produces a constant named after it. A record field, written as
/// `name { ... }`, produces a `TypedPath<Doc>` constant plus a module of the
/// same name holding the paths of its children. A leaf field is written as
/// `name: Type`; collections are always leaves.
///
/// Fields are separated by commas. The generated modules glob-import their
/// parent, so leaf types in scope at the invocation site resolve everywhere.
///
/// ```
/// use pathstore::{Doc, TypedPath, state_paths};
///
/// state_paths! {
///     mod drinks {
///         drink {
///             beer: bool,
///             kind: String,
///         },
///     }
/// }
///
/// fn main() {
///     let kind: TypedPath<String> = drinks::drink::kind;
///     let drink: TypedPath<Doc> = drinks::drink;
///     assert_eq!(kind.as_str(), "drink.kind");
///     assert_eq!(drink.as_str(), "drink");
/// }
/// ```
#[macro_export]
macro_rules! state_paths {
    (@fields [$($prefix:ident)*]) => {};

    // Record field: a path constant plus a module for the children
    (@fields [$($prefix:ident)*] $field:ident { $($inner:tt)* } $(, $($rest:tt)*)?) => {
        pub const $field: $crate::TypedPath<$crate::Doc> = $crate::TypedPath::new(
            concat!($(stringify!($prefix), ".",)* stringify!($field))
        );

        pub mod $field {
            #[allow(unused_imports)]
            use super::*;

            $crate::state_paths!(@fields [$($prefix)* $field] $($inner)*);
        }

        $crate::state_paths!(@fields [$($prefix)*] $($($rest)*)?);
    };

    // Leaf field
    (@fields [$($prefix:ident)*] $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        pub const $field: $crate::TypedPath<$ty> = $crate::TypedPath::new(
            concat!($(stringify!($prefix), ".",)* stringify!($field))
        );

        $crate::state_paths!(@fields [$($prefix)*] $($($rest)*)?);
    };

    ($(#[$meta:meta])* $vis:vis mod $name:ident { $($body:tt)* }) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals, dead_code)]
        $vis mod $name {
            #[allow(unused_imports)]
            use super::*;

            $crate::state_paths!(@fields [] $($body)*);
        }
    };
}
