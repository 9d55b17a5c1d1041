//! Convenience constructors on any [`Router`].

use crate::pagination::{PaginatedQuery, PartialPagination};
use crate::parse::ParseQuery;
use crate::query::{QueryEngine, QueryOptions};
use crate::router::Router;
use querysync_types::AbstractQuery;

/// Build engines borrowing a router
pub trait RouterExt: Router + Sized {
    /// A query engine over this router
    fn query(
        &self,
        parser: impl ParseQuery + 'static,
        default_query: AbstractQuery,
        options: QueryOptions,
    ) -> QueryEngine<&Self> {
        QueryEngine::new(self, parser, default_query, options)
    }

    /// A query engine with pagination over this router
    fn query_and_pagination(
        &self,
        parser: impl ParseQuery + 'static,
        default_query: AbstractQuery,
        default_pagination: PartialPagination,
        options: QueryOptions,
    ) -> PaginatedQuery<&Self> {
        PaginatedQuery::new(self, parser, default_query, default_pagination, options)
    }

    /// Pagination alone over this router
    fn pagination(
        &self,
        default_pagination: PartialPagination,
        options: QueryOptions,
    ) -> PaginatedQuery<&Self> {
        PaginatedQuery::pagination_only(self, default_pagination, options)
    }
}

impl<R: Router> RouterExt for R {}
