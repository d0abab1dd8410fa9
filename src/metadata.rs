//! Metadata mappings for groups and examples.
//!
//! Metadata is a persistent (`im`) map, so handing a group's metadata down to
//! every child is a cheap structural share rather than a deep copy. Merging is
//! always explicit: nothing is looked up through the parent at read time.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Key under which a finalized result is stored in example metadata.
pub const EXECUTION_RESULT_KEY: &str = "execution_result";
/// Key holding the bare description of a group or example.
pub const DESCRIPTION_KEY: &str = "description";
/// Key holding the description prefixed with every ancestor group's description.
pub const FULL_DESCRIPTION_KEY: &str = "full_description";

/// An order-insensitive mapping of metadata keys to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: HashMap<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use exemplar::metadata::Metadata;
    /// use exemplar::value::Value;
    /// let meta = Metadata::new().with("demo", Value::symbol("data"));
    /// assert_eq!(meta.get("demo"), Some(&Value::symbol("data")));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// True if every entry of `other` is present here with an equal value.
    pub fn includes(&self, other: &Metadata) -> bool {
        other
            .entries
            .iter()
            .all(|(k, v)| self.entries.get(k) == Some(v))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the union of `inherited` and `own`; `own` wins on collision.
    pub fn merge(inherited: &Metadata, own: &Metadata) -> Metadata {
        Metadata {
            entries: own.entries.clone().union(inherited.entries.clone()),
        }
    }
}

/// Joins a parent's full description with a child description.
pub(crate) fn join_description(parent_full: Option<&str>, own: &str) -> String {
    match parent_full {
        Some(parent) if !parent.is_empty() && !own.is_empty() => format!("{} {}", parent, own),
        Some(parent) if own.is_empty() => parent.to_string(),
        _ => own.to_string(),
    }
}
