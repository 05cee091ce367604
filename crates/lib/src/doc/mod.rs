//! Record-shaped state documents.
//!
//! This module provides the state model the store operates on. A [`Doc`] is a
//! record: a set of named fields, each holding a [`Value`]. Records nest, and
//! dotted paths address fields through any depth of nesting.
//!
//! # Path traversal
//!
//! Traversal descends one field per segment and only ever through records.
//! Reaching a scalar, `Null`, list, or map before the last segment ends the
//! walk with `None`. There is no index syntax for lists and no key syntax for
//! maps; those values are read and written whole.
//!
//! ```
//! use pathstore::{Doc, Value};
//!
//! let doc = Doc::new()
//!     .with_doc("drink", Doc::new().with_bool("beer", true).with_text("kind", "guiness"))
//!     .with_list("animals", vec![Value::from("dogs")]);
//!
//! assert_eq!(doc.get_path("drink.kind"), Some(&Value::from("guiness")));
//! assert_eq!(doc.get_path("drink.beer"), Some(&Value::Bool(true)));
//! assert!(doc.get_path("drink.missing").is_none());
//! assert!(doc.get_path("animals.0").is_none()); // lists are leaves
//! ```

use std::{collections::HashMap, fmt};

use serde::{Serialize, de::DeserializeOwned};

pub mod errors;
pub mod path;
pub mod value;

pub use errors::DocError;
pub use path::TypedPath;
pub use value::Value;

/// A record: named fields holding [`Value`]s.
///
/// Direct field access (`get`, `set`, `remove`) treats the key literally, dots
/// included. Dotted traversal is only done by the `*_path` methods.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct Doc {
    /// Fields indexed by name
    fields: HashMap<String, Value>,
}

impl Doc {
    /// Creates a new empty record
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Returns true if this record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has the given field
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Gets a field by name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Gets a mutable reference to a field by name
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Gets a field with automatic type conversion using TryFrom
    ///
    /// Returns None if the field doesn't exist or has a different type.
    ///
    /// ```
    /// # use pathstore::Doc;
    /// let doc = Doc::new().with_text("name", "Alice").with_int("age", 30);
    ///
    /// assert_eq!(doc.get_as::<&str>("name"), Some("Alice"));
    /// assert_eq!(doc.get_as::<i64>("age"), Some(30));
    /// assert_eq!(doc.get_as::<i64>("name"), None);
    /// assert_eq!(doc.get_as::<String>("missing"), None);
    /// ```
    pub fn get_as<'a, T>(&'a self, key: &str) -> Option<T>
    where
        T: TryFrom<&'a Value, Error = DocError>,
    {
        let value = self.get(key)?;
        T::try_from(value).ok()
    }

    /// Get a reference to a nested record by field name
    pub fn get_doc(&self, key: &str) -> Option<&Doc> {
        self.get(key)?.as_doc()
    }

    /// Sets a field, returning the previous value if present
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Removes a field, returning its value if present
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Returns an iterator over all fields
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Returns an iterator over all field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Returns an iterator over all field values
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// Resolves a dotted path to the value it names.
    ///
    /// Returns `None` as soon as a segment is missing or an intermediate value
    /// is not a record. A present value is returned whatever it holds,
    /// including `false`, `0`, `""` and [`Value::Null`].
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path::segments(path);
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_doc()?.fields.get(segment)?;
        }
        Some(current)
    }

    /// Returns true if the path resolves to a present value
    pub fn contains_path(&self, path: &str) -> bool {
        self.get_path(path).is_some()
    }

    /// Resolves the record that holds the last segment of `path`.
    ///
    /// See [`Doc::parent_mut`].
    pub fn parent<'p>(&self, path: &'p str) -> Option<(&Doc, &'p str)> {
        let (parent, last) = path::split_last(path);
        let mut current = self;
        if let Some(parent) = parent {
            for segment in path::segments(parent) {
                current = current.fields.get(segment)?.as_doc()?;
            }
        }
        Some((current, last))
    }

    /// Mutable counterpart of [`Doc::parent`].
    ///
    /// Returns that record together with the last segment, which may or may
    /// not already exist as a field. Returns `None` when any segment before the
    /// last is missing or is not a record; no intermediate records are created.
    ///
    /// ```
    /// # use pathstore::Doc;
    /// let mut doc = Doc::new().with_doc("drink", Doc::new());
    ///
    /// let (container, key) = doc.parent_mut("drink.kind").unwrap();
    /// assert_eq!(key, "kind");
    /// container.set(key, "stout");
    /// assert_eq!(doc.get_path("drink.kind").and_then(|v| v.as_text()), Some("stout"));
    ///
    /// assert!(doc.parent_mut("food.pasta").is_none());
    /// ```
    pub fn parent_mut<'p>(&mut self, path: &'p str) -> Option<(&mut Doc, &'p str)> {
        let (parent, last) = path::split_last(path);
        let mut current = self;
        if let Some(parent) = parent {
            for segment in path::segments(parent) {
                current = current.fields.get_mut(segment)?.as_doc_mut()?;
            }
        }
        Some((current, last))
    }

    /// Converts any serializable record into a document.
    ///
    /// Fails with [`DocError::NotARecord`] if `value` does not serialize to a
    /// JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, DocError> {
        let json = serde_json::to_value(value).map_err(|e| DocError::SerializationFailed {
            reason: e.to_string(),
        })?;
        Doc::try_from(json)
    }

    /// Deserializes this document into a user-defined type.
    pub fn to_deserialize<T: DeserializeOwned>(&self) -> Result<T, DocError> {
        serde_json::from_value(self.clone().into()).map_err(|e| {
            DocError::DeserializationFailed {
                reason: e.to_string(),
            }
        })
    }

    pub(crate) fn from_json_object(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

// Builder pattern methods
impl Doc {
    /// Builder method to set a value and return self
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder method to set a boolean value
    pub fn with_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.with(key, Value::Bool(value))
    }

    /// Builder method to set an integer value
    pub fn with_int(self, key: impl Into<String>, value: i64) -> Self {
        self.with(key, Value::Int(value))
    }

    /// Builder method to set a float value
    pub fn with_float(self, key: impl Into<String>, value: f64) -> Self {
        self.with(key, Value::Float(value))
    }

    /// Builder method to set a text value
    pub fn with_text(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, Value::Text(value.into()))
    }

    /// Builder method to set a list value
    pub fn with_list(self, key: impl Into<String>, value: impl Into<Vec<Value>>) -> Self {
        self.with(key, Value::List(value.into()))
    }

    /// Builder method to set a nested record
    pub fn with_doc(self, key: impl Into<String>, value: Doc) -> Self {
        self.with(key, Value::Doc(value))
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sorted so output is stable across runs
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        write!(f, "{{")?;
        for (i, (key, value)) in fields.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Doc {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Doc {
    type Error = DocError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Object(fields) => Ok(Doc::from_json_object(fields)),
            other => Err(DocError::NotARecord {
                found: Value::from(other).type_name().to_string(),
            }),
        }
    }
}

impl From<Doc> for serde_json::Value {
    fn from(doc: Doc) -> Self {
        serde_json::Value::Object(
            doc.fields
                .into_iter()
                .map(|(k, v)| (k, v.into()))
                .collect(),
        )
    }
}
