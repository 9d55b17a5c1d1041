//! Router implementations for querysync.
//!
//! - [`InMemoryRouter`]: a caller-owned in-memory store
//! - [`SearchParamsRouter`]: the search string of a [`BrowserHistory`]
//! - [`QueryObjectRouter`]: a route query object changed through a [`Navigator`]

pub mod history;
pub mod memory;
pub mod query_object;
pub mod search_params;

pub use history::{BrowserHistory, Location};
pub use memory::InMemoryRouter;
pub use query_object::{HistoryNavigator, Navigator, QueryObjectRouter};
pub use search_params::{SearchParams, SearchParamsRouter, QUERY_ARRAY_SEPARATOR};
