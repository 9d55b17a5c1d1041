//! Router holding its query in memory.

use parking_lot::RwLock;
use querysync_core::{merge_partial, FlatQuery, Router, RouterResult};

/// A caller-owned in-memory flat query.
///
/// Each instance is its own store; two routers never share state unless the
/// caller shares the instance itself.
#[derive(Debug, Default)]
pub struct InMemoryRouter {
    query: RwLock<FlatQuery>,
}

impl InMemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing query
    pub fn with_query(query: FlatQuery) -> Self {
        Self {
            query: RwLock::new(query),
        }
    }

    /// The stored query without defaults
    pub fn snapshot(&self) -> FlatQuery {
        self.query.read().clone()
    }

    pub fn clear(&self) {
        *self.query.write() = FlatQuery::new();
    }
}

impl Router for InMemoryRouter {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        self.query.read().over(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        merge_partial(&mut self.query.write(), query, default_query);
        Ok(())
    }
}
