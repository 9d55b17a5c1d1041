//! # querysync-core
//!
//! Core library for querysync: keeping a typed query in sync with a flat,
//! string-keyed store such as a URL search string.
//!
//! The building blocks are:
//!
//! - [`Router`]: the store contract (get and merge a [`FlatQuery`])
//! - [`QueryEngine`]: typed reads and writes through a parser, a converter
//!   and a default query
//! - [`PaginatedQuery`]: a query engine paired with `page`/`size`, where
//!   changing the query resets the page
//! - [`Schema`]: a declarative [`ParseQuery`] implementation
//! - [`QuerySyncConfig`]: YAML configuration for all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use querysync_core::{ChangeQueryOptions, FieldKind, PaginatedQuery, QueryOptions, Schema};
//! use querysync_types::AbstractQuery;
//!
//! let schema = Schema::new().field("search", FieldKind::string());
//! let list = PaginatedQuery::new(
//!     &router,
//!     schema,
//!     AbstractQuery::new().with("search", ""),
//!     Default::default(),
//!     QueryOptions::default(),
//! );
//!
//! list.set_page(2)?;
//! list.set_query(&AbstractQuery::new().with("search", "Max"), ChangeQueryOptions::default())?;
//! assert_eq!(list.page(), 0);
//! ```

pub mod config;
pub mod convert;
pub mod ext;
pub mod pagination;
pub mod parse;
pub mod query;
pub mod router;
pub mod schema;

pub use config::{ArrayEncoding, ConfigError, HistoryMode, QuerySyncConfig, RouterConfig};
pub use convert::{ConvertToQuery, StringifyValues};
pub use ext::RouterExt;
pub use pagination::{
    parse_pagination, ChangeQueryOptions, PaginatedQuery, Pagination, PartialPagination, PAGE_KEY,
    SIZE_KEY,
};
pub use parse::{safe_parse, ParseError, ParseNothing, ParseQuery};
pub use query::{QueryEngine, QueryOptions};
pub use router::{merge_partial, Router, RouterError, RouterResult};
pub use schema::{FieldKind, ScalarKind, Schema};

pub use querysync_types::{AbstractQuery, FlatQuery, FlatValue, QueryScalar, QueryValue};
