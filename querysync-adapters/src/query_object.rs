//! Router over a framework-style route query object.
//!
//! The route exposes its query as a map and changes it by navigating to a
//! whole new query object (a shallow push). The navigation itself is done by
//! a [`Navigator`], which may fail; a failed navigation leaves the route
//! query unchanged and the error goes back to the caller.

use crate::history::BrowserHistory;
use crate::search_params::SearchParams;
use parking_lot::RwLock;
use querysync_core::{merge_partial, FlatQuery, FlatValue, HistoryMode, Router, RouterResult};
use std::sync::Arc;
use tracing::debug;

/// Performs the navigation to a new route query
pub trait Navigator: Send + Sync {
    fn push(&self, query: &FlatQuery) -> RouterResult<()>;
}

/// Navigates by pushing onto a [`BrowserHistory`], keeping the pathname.
///
/// Lists are written as repeated parameters.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    history: Arc<BrowserHistory>,
}

impl HistoryNavigator {
    pub fn new(history: Arc<BrowserHistory>) -> Self {
        Self { history }
    }

    /// The query object of the history's current location
    pub fn current_query(&self) -> FlatQuery {
        let params = SearchParams::parse(&self.history.location().search);
        params
            .keys()
            .into_iter()
            .map(|key| {
                let values = params.get_all(key).into_iter().map(str::to_string).collect();
                (key.to_string(), FlatValue::from_list(values))
            })
            .collect()
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, query: &FlatQuery) -> RouterResult<()> {
        let mut params = SearchParams::default();
        for (key, value) in query {
            for v in value.as_list() {
                params.append(key, v);
            }
        }
        let search = params.to_search();
        self.history
            .update(HistoryMode::Push, |location| location.with_search(search));
        Ok(())
    }
}

/// Router over a route query object
#[derive(Debug)]
pub struct QueryObjectRouter<N> {
    route: RwLock<FlatQuery>,
    navigator: N,
}

impl<N: Navigator> QueryObjectRouter<N> {
    pub fn new(initial: FlatQuery, navigator: N) -> Self {
        Self {
            route: RwLock::new(initial),
            navigator,
        }
    }

    /// The current route query without defaults
    pub fn route_query(&self) -> FlatQuery {
        self.route.read().clone()
    }

    /// Follow a navigation that happened outside this router
    pub fn on_route_change(&self, query: FlatQuery) {
        *self.route.write() = query;
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

impl QueryObjectRouter<HistoryNavigator> {
    /// A router reading its initial query from the history's location
    pub fn from_history(history: Arc<BrowserHistory>) -> Self {
        let navigator = HistoryNavigator::new(history);
        Self::new(navigator.current_query(), navigator)
    }

    /// Re-read the route query after back/forward navigation
    pub fn sync_with_history(&self) {
        self.on_route_change(self.navigator.current_query());
    }
}

impl<N: Navigator> Router for QueryObjectRouter<N> {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        self.route.read().over(default_query)
    }

    /// The route stays write-locked until the navigation has finished, so
    /// a navigator must not call back into this router.
    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        let mut route = self.route.write();
        let mut next = route.clone();
        merge_partial(&mut next, query, default_query);

        debug!(keys = ?next.keys().collect::<Vec<_>>(), "shallow push");
        self.navigator.push(&next)?;
        *route = next;
        Ok(())
    }
}
