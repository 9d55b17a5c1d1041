//! The flat query store contract.
//!
//! A [`Router`] is anything that can hold a [`FlatQuery`]: component state,
//! a browser location, a framework router. The engines only ever talk to a
//! store through this trait.

use querysync_types::{FlatQuery, FlatValue};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type RouterResult<T> = Result<T, RouterError>;

/// Get/set access to a flat query store
pub trait Router {
    /// The current query, falling back to `default_query` for every key the
    /// store does not hold: `{...default_query, ...live}`.
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery;

    /// Merge `query` into the store.
    ///
    /// Keys whose value matches the value in `default_query` are removed from
    /// the store instead of written. Keys not mentioned in `query` are left
    /// alone.
    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()>;
}

impl<R: Router + ?Sized> Router for &R {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        (**self).get_query(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        (**self).set_query(query, default_query)
    }
}

impl<R: Router + ?Sized> Router for Arc<R> {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        (**self).get_query(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        (**self).set_query(query, default_query)
    }
}

impl<R: Router + ?Sized> Router for Rc<R> {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        (**self).get_query(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        (**self).set_query(query, default_query)
    }
}

impl<R: Router + ?Sized> Router for Box<R> {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        (**self).get_query(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        (**self).set_query(query, default_query)
    }
}

/// Apply a partial update to a live flat query, dropping default-valued keys.
///
/// This is the storage-side half of the [`Router::set_query`] contract, shared
/// by adapters that keep their state as a plain [`FlatQuery`].
pub fn merge_partial(live: &mut FlatQuery, query: &FlatQuery, default_query: &FlatQuery) {
    for (key, value) in query {
        if is_default(key, value, default_query) {
            live.remove(key);
        } else {
            live.insert(key.clone(), value.clone());
        }
    }
}

/// Whether `value` equals the default for `key`
pub fn is_default(key: &str, value: &FlatValue, default_query: &FlatQuery) -> bool {
    default_query.matches(key, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_partial_removes_defaults() {
        let mut live = FlatQuery::new().with("search", "Max").with("page", "2");
        let defaults = FlatQuery::new().with("search", "").with("page", "0");

        merge_partial(&mut live, &FlatQuery::new().with("search", ""), &defaults);

        assert!(!live.contains_key("search"));
        assert_eq!(live.get("page"), Some(&FlatValue::from("2")));
    }

    #[test]
    fn test_merge_partial_keeps_foreign_keys() {
        let mut live = FlatQuery::new().with("greeting", "hello");
        let defaults = FlatQuery::new().with("search", "");

        merge_partial(&mut live, &FlatQuery::new().with("search", "Max"), &defaults);

        assert_eq!(live.get("greeting"), Some(&FlatValue::from("hello")));
        assert_eq!(live.get("search"), Some(&FlatValue::from("Max")));
    }

    #[test]
    fn test_keys_without_default_are_always_written() {
        let mut live = FlatQuery::new();
        merge_partial(
            &mut live,
            &FlatQuery::new().with("department", ""),
            &FlatQuery::new(),
        );
        assert_eq!(live.get("department"), Some(&FlatValue::from("")));
    }
}
