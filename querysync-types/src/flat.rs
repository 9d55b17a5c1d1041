//! The flat, string-only query representation stored by routers.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// A single flat query value: one string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatValue {
    Single(String),
    Many(Vec<String>),
}

impl FlatValue {
    /// View the value as a list of strings
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            FlatValue::Single(s) => vec![s.as_str()],
            FlatValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// The first string of the value, if any
    pub fn first(&self) -> Option<&str> {
        match self {
            FlatValue::Single(s) => Some(s),
            FlatValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// The value as a single string, `None` for lists
    pub fn as_single(&self) -> Option<&str> {
        match self {
            FlatValue::Single(s) => Some(s),
            FlatValue::Many(_) => None,
        }
    }

    /// Whether two values denote the same parameter content.
    ///
    /// A one-element list matches the equivalent single string, since most
    /// URL encodings cannot tell them apart.
    pub fn matches(&self, other: &FlatValue) -> bool {
        self.as_list() == other.as_list()
    }

    /// Collapse a list of strings into the most natural value.
    ///
    /// Exactly one element yields [`FlatValue::Single`].
    pub fn from_list(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            FlatValue::Single(values.remove(0))
        } else {
            FlatValue::Many(values)
        }
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Single(s) => f.write_str(s),
            FlatValue::Many(values) => f.write_str(&values.join(",")),
        }
    }
}

impl From<String> for FlatValue {
    fn from(s: String) -> Self {
        FlatValue::Single(s)
    }
}

impl From<&str> for FlatValue {
    fn from(s: &str) -> Self {
        FlatValue::Single(s.to_string())
    }
}

impl From<Vec<String>> for FlatValue {
    fn from(values: Vec<String>) -> Self {
        FlatValue::Many(values)
    }
}

impl From<Vec<&str>> for FlatValue {
    fn from(values: Vec<&str>) -> Self {
        FlatValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// The wire-level query: string keys to [`FlatValue`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatQuery(BTreeMap<String, FlatValue>);

impl FlatQuery {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&FlatValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FlatValue>) -> Option<FlatValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<FlatValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FlatValue> {
        self.0.iter()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FlatValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `self` on top of `base`: `{...base, ...self}`
    pub fn over(&self, base: &FlatQuery) -> FlatQuery {
        let mut merged = base.clone();
        merged.extend(self.clone());
        merged
    }

    /// Whether `value` equals the value stored for `key` in this query
    pub fn matches(&self, key: &str, value: &FlatValue) -> bool {
        self.0.get(key).is_some_and(|v| v.matches(value))
    }
}

impl Extend<(String, FlatValue)> for FlatQuery {
    fn extend<I: IntoIterator<Item = (String, FlatValue)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for FlatQuery
where
    K: Into<String>,
    V: Into<FlatValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for FlatQuery {
    type Item = (String, FlatValue);
    type IntoIter = btree_map::IntoIter<String, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlatQuery {
    type Item = (&'a String, &'a FlatValue);
    type IntoIter = btree_map::Iter<'a, String, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<BTreeMap<String, FlatValue>> for FlatQuery {
    fn from(map: BTreeMap<String, FlatValue>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_matches_one_element_list() {
        let single = FlatValue::from("a");
        let list = FlatValue::from(vec!["a"]);
        assert!(single.matches(&list));
        assert!(!single.matches(&FlatValue::from(vec!["a", "b"])));
    }

    #[test]
    fn test_from_list_collapses_single_element() {
        assert_eq!(FlatValue::from_list(vec!["x".into()]), FlatValue::from("x"));
        assert_eq!(
            FlatValue::from_list(vec!["x".into(), "y".into()]),
            FlatValue::from(vec!["x", "y"])
        );
        assert_eq!(FlatValue::from_list(vec![]), FlatValue::Many(vec![]));
    }

    #[test]
    fn test_over_prefers_live_values() {
        let defaults = FlatQuery::new().with("search", "").with("page", "0");
        let live = FlatQuery::new().with("search", "Max").with("greeting", "hello");

        let merged = live.over(&defaults);
        assert_eq!(merged.get("search"), Some(&FlatValue::from("Max")));
        assert_eq!(merged.get("page"), Some(&FlatValue::from("0")));
        assert_eq!(merged.get("greeting"), Some(&FlatValue::from("hello")));
    }

    #[test]
    fn test_serde_shape() {
        let query = FlatQuery::new()
            .with("tags", vec!["a", "b"])
            .with("search", "Max");
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#"{"search":"Max","tags":["a","b"]}"#);

        let back: FlatQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
