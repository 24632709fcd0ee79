//! Filter model
//!
//! Provides [`FilterModel`], the record of named filter values shared by the
//! store, the settled view and the codec.

use crate::value::FilterValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mapping from filter name to value
///
/// Iteration follows insertion order, which decides the order of emitted
/// query pairs, so equality compares order too. Replacing the value of an
/// existing key keeps its position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterModel {
    entries: IndexMap<String, FilterValue>,
}

impl FilterModel {
    /// Create empty model
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a filter value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    /// Mutable lookup
    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut FilterValue> {
        self.entries.get_mut(key)
    }

    /// Check if a key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) -> Option<FilterValue> {
        self.entries.insert(key.into(), value)
    }

    /// Remove a key, keeping the order of the remaining entries
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.entries.shift_remove(key)
    }

    /// Assign `value` to `key`; `None` removes the key
    pub fn assign(&mut self, key: &str, value: Option<FilterValue>) {
        match value {
            Some(value) => {
                self.insert(key, value);
            }
            None => {
                self.remove(key);
            }
        }
    }

    /// Drop every falsy entry
    pub fn prune(&mut self) {
        self.entries.retain(|_, value| value.is_truthy());
    }

    /// Consuming variant of [`prune`](Self::prune)
    #[inline]
    #[must_use]
    pub fn pruned(mut self) -> Self {
        self.prune();
        self
    }

    /// Check that no falsy entry is present
    #[must_use]
    pub fn is_pruned(&self) -> bool {
        self.entries.values().all(FilterValue::is_truthy)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty model
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for FilterModel {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for FilterModel {}

impl<K: Into<String>> FromIterator<(K, FilterValue)> for FilterModel {
    fn from_iter<I: IntoIterator<Item = (K, FilterValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, value)| (key.into(), value)).collect(),
        }
    }
}

impl IntoIterator for FilterModel {
    type Item = (String, FilterValue);
    type IntoIter = indexmap::map::IntoIter<String, FilterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replace_keeps_position() {
        let mut model: FilterModel = [
            ("a", FilterValue::from("1")),
            ("b", FilterValue::from("2")),
        ]
        .into_iter()
        .collect();

        model.assign("a", Some(FilterValue::from("3")));

        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(model.get("a"), Some(&FilterValue::from("3")));
    }

    #[test]
    fn prune_drops_falsy_entries() {
        let model: FilterModel = [
            ("empty", FilterValue::from("")),
            ("off", FilterValue::Bool(false)),
            ("none", FilterValue::List(Vec::new())),
            ("on", FilterValue::Bool(true)),
            ("text", FilterValue::from("x")),
        ]
        .into_iter()
        .collect();

        assert!(!model.is_pruned());
        let model = model.pruned();

        assert!(model.is_pruned());
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["on", "text"]);
    }

    #[test]
    fn equality_respects_order() {
        let left: FilterModel = [("a", FilterValue::Bool(true)), ("b", FilterValue::from("x"))]
            .into_iter()
            .collect();
        let right: FilterModel = [("b", FilterValue::from("x")), ("a", FilterValue::Bool(true))]
            .into_iter()
            .collect();
        assert_ne!(left, right);
        assert_eq!(left, left.clone());
    }

    #[test]
    fn json_object_form() {
        let model: FilterModel =
            serde_json::from_str(r#"{"status": true, "color": ["red", "blue"]}"#).unwrap();
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["status", "color"]);
        assert_eq!(
            serde_json::to_string(&model).unwrap(),
            r#"{"status":true,"color":["red","blue"]}"#
        );
    }
}
