//! The abstract query engine.
//!
//! A [`QueryEngine`] binds a [`Router`], a parser and a default query. Reads
//! are recomputed from the router on every call; writes go straight through
//! to it. The engine keeps no state of its own besides its configuration.

use crate::convert::{ConvertToQuery, StringifyValues};
use crate::parse::{safe_parse, ParseQuery};
use crate::router::{Router, RouterResult};
use querysync_types::{AbstractQuery, FlatQuery};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Per-engine options
#[derive(Clone)]
pub struct QueryOptions {
    /// How typed queries are converted to flat queries
    pub convert_to_query: Arc<dyn ConvertToQuery>,
}

impl QueryOptions {
    pub fn with_converter(converter: impl ConvertToQuery + 'static) -> Self {
        Self {
            convert_to_query: Arc::new(converter),
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::with_converter(StringifyValues)
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions").finish_non_exhaustive()
    }
}

/// Typed read/write access to the keys of a flat store named by a default
/// query and a parser
#[derive(Clone)]
pub struct QueryEngine<R> {
    router: R,
    parser: Arc<dyn ParseQuery>,
    default_query: AbstractQuery,
    converted_default: FlatQuery,
    options: QueryOptions,
}

impl<R: Router> QueryEngine<R> {
    pub fn new(
        router: R,
        parser: impl ParseQuery + 'static,
        default_query: AbstractQuery,
        options: QueryOptions,
    ) -> Self {
        Self::with_shared_parser(router, Arc::new(parser), default_query, options)
    }

    /// An engine without defaults and with the default options
    pub fn with_parser(router: R, parser: impl ParseQuery + 'static) -> Self {
        Self::new(router, parser, AbstractQuery::new(), QueryOptions::default())
    }

    pub fn with_shared_parser(
        router: R,
        parser: Arc<dyn ParseQuery>,
        default_query: AbstractQuery,
        options: QueryOptions,
    ) -> Self {
        let converted_default = options.convert_to_query.convert(&default_query);
        Self {
            router,
            parser,
            default_query,
            converted_default,
            options,
        }
    }

    /// The current typed query: defaults overlaid with whatever parses
    pub fn query(&self) -> AbstractQuery {
        let parsed = safe_parse(self.parser.as_ref(), &self.flat_query());
        parsed.over(&self.default_query)
    }

    /// The current flat query as seen through the defaults
    pub fn flat_query(&self) -> FlatQuery {
        self.router.get_query(&self.converted_default)
    }

    /// Write the given fields; fields equal to their default are removed
    pub fn set_query(&self, query: &AbstractQuery) -> RouterResult<()> {
        let flat = self.convert(query);
        debug!(keys = ?flat.keys().collect::<Vec<_>>(), "setting query");
        self.router.set_query(&flat, &self.converted_default)
    }

    /// Restore every defaulted key, which removes them from the store
    pub fn reset_query(&self) -> RouterResult<()> {
        debug!("resetting query");
        self.router
            .set_query(&self.converted_default, &self.converted_default)
    }

    /// Convert a typed query with this engine's converter
    pub fn convert(&self, query: &AbstractQuery) -> FlatQuery {
        self.options.convert_to_query.convert(query)
    }

    pub fn default_query(&self) -> &AbstractQuery {
        &self.default_query
    }

    pub fn converted_default(&self) -> &FlatQuery {
        &self.converted_default
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }
}

impl<R> fmt::Debug for QueryEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("default_query", &self.default_query)
            .field("converted_default", &self.converted_default)
            .finish_non_exhaustive()
    }
}
