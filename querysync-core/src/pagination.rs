//! Pagination composed with a free-form query.
//!
//! [`PaginatedQuery`] drives two [`QueryEngine`]s over one router: one for
//! the caller's free-form query and one for the fixed `page`/`size` pair.
//! Changing the free-form query resets the page unless the caller opts out,
//! and that reset is written in the same router call as the query change.

use crate::parse::{ParseError, ParseNothing, ParseQuery};
use crate::query::{QueryEngine, QueryOptions};
use crate::router::{Router, RouterResult};
use querysync_types::{AbstractQuery, FlatQuery, FlatValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const PAGE_KEY: &str = "page";
pub const SIZE_KEY: &str = "size";

pub const DEFAULT_PAGE: u64 = 0;
pub const DEFAULT_SIZE: u64 = 15;

/// A page index and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_size() -> u64 {
    DEFAULT_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    fn to_query(self) -> AbstractQuery {
        AbstractQuery::new()
            .with(PAGE_KEY, self.page)
            .with(SIZE_KEY, self.size)
    }
}

/// Some of the pagination fields; unset fields are left alone or defaulted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialPagination {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl PartialPagination {
    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page),
            size: None,
        }
    }

    pub fn size(size: u64) -> Self {
        Self {
            page: None,
            size: Some(size),
        }
    }

    /// Fill unset fields from `base`
    pub fn or(self, base: Pagination) -> Pagination {
        Pagination {
            page: self.page.unwrap_or(base.page),
            size: self.size.unwrap_or(base.size),
        }
    }

    fn to_query(self) -> AbstractQuery {
        let mut query = AbstractQuery::new();
        if let Some(page) = self.page {
            query.insert(PAGE_KEY, page);
        }
        if let Some(size) = self.size {
            query.insert(SIZE_KEY, size);
        }
        query
    }
}

impl From<Pagination> for PartialPagination {
    fn from(p: Pagination) -> Self {
        Self {
            page: Some(p.page),
            size: Some(p.size),
        }
    }
}

/// Options for changes to the free-form query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeQueryOptions {
    /// Reset the page to its default along with the query change
    pub reset_page: bool,
}

impl Default for ChangeQueryOptions {
    fn default() -> Self {
        Self { reset_page: true }
    }
}

impl ChangeQueryOptions {
    pub fn keep_page() -> Self {
        Self { reset_page: false }
    }
}

/// Parse a base-10 integer, treating anything else as missing
pub fn flat_value_to_int(value: Option<&FlatValue>) -> Option<i64> {
    value?.as_single()?.trim().parse().ok()
}

/// The built-in pagination parser.
///
/// Negative pages and non-positive sizes are treated like non-numeric input.
pub fn parse_pagination(query: &FlatQuery) -> Result<AbstractQuery, ParseError> {
    let mut parsed = AbstractQuery::new();
    if let Some(page) = flat_value_to_int(query.get(PAGE_KEY)).filter(|p| *p >= 0) {
        parsed.insert(PAGE_KEY, page);
    }
    if let Some(size) = flat_value_to_int(query.get(SIZE_KEY)).filter(|s| *s > 0) {
        parsed.insert(SIZE_KEY, size);
    }
    Ok(parsed)
}

/// A free-form query plus pagination over one router
#[derive(Debug, Clone)]
pub struct PaginatedQuery<R> {
    query: QueryEngine<R>,
    pagination: QueryEngine<R>,
    default_pagination: Pagination,
}

impl<R: Router + Clone> PaginatedQuery<R> {
    pub fn new(
        router: R,
        parser: impl ParseQuery + 'static,
        default_query: AbstractQuery,
        default_pagination: PartialPagination,
        options: QueryOptions,
    ) -> Self {
        Self::with_shared_parser(
            router,
            Arc::new(parser),
            default_query,
            default_pagination,
            options,
        )
    }

    pub fn with_shared_parser(
        router: R,
        parser: Arc<dyn ParseQuery>,
        default_query: AbstractQuery,
        default_pagination: PartialPagination,
        options: QueryOptions,
    ) -> Self {
        let default_pagination = default_pagination.or(Pagination::default());
        let pagination = QueryEngine::new(
            router.clone(),
            parse_pagination,
            default_pagination.to_query(),
            options.clone(),
        );
        let query = QueryEngine::with_shared_parser(router, parser, default_query, options);
        Self {
            query,
            pagination,
            default_pagination,
        }
    }

    /// Pagination without a free-form query; [`Self::query`] is always empty
    pub fn pagination_only(router: R, default_pagination: PartialPagination, options: QueryOptions) -> Self {
        Self::new(
            router,
            ParseNothing,
            AbstractQuery::new(),
            default_pagination,
            options,
        )
    }

    pub fn query(&self) -> AbstractQuery {
        self.query.query()
    }

    /// Change the free-form query, resetting the page unless suppressed
    pub fn set_query(&self, query: &AbstractQuery, options: ChangeQueryOptions) -> RouterResult<()> {
        let flat = self.query.convert(query);
        self.write_with_page(flat, options)
    }

    /// Restore the free-form query, resetting the page unless suppressed
    pub fn reset_query(&self, options: ChangeQueryOptions) -> RouterResult<()> {
        let flat = self.query.converted_default().clone();
        self.write_with_page(flat, options)
    }

    pub fn page(&self) -> u64 {
        self.pagination().page
    }

    pub fn size(&self) -> u64 {
        self.pagination().size
    }

    /// The current page and size, defaulted
    pub fn pagination(&self) -> Pagination {
        let parsed = self.pagination.query();
        Pagination {
            page: parsed
                .get_i64(PAGE_KEY)
                .and_then(|p| u64::try_from(p).ok())
                .unwrap_or(self.default_pagination.page),
            size: parsed
                .get_i64(SIZE_KEY)
                .and_then(|s| u64::try_from(s).ok())
                .unwrap_or(self.default_pagination.size),
        }
    }

    pub fn set_page(&self, page: u64) -> RouterResult<()> {
        self.set_pagination(PartialPagination::page(page))
    }

    pub fn set_size(&self, size: u64) -> RouterResult<()> {
        self.set_pagination(PartialPagination::size(size))
    }

    /// Write pagination fields directly, without touching the free-form query
    pub fn set_pagination(&self, pagination: PartialPagination) -> RouterResult<()> {
        self.pagination.set_query(&pagination.to_query())
    }

    /// Restore page and size; the free-form query is left alone
    pub fn reset_pagination(&self) -> RouterResult<()> {
        self.pagination.reset_query()
    }

    /// Restore the free-form query and the pagination in one write
    pub fn reset_query_and_pagination(&self) -> RouterResult<()> {
        debug!("resetting query and pagination");
        let defaults = self.combined_default();
        self.query.router().set_query(&defaults, &defaults)
    }

    pub fn default_pagination(&self) -> Pagination {
        self.default_pagination
    }

    pub fn default_query(&self) -> &AbstractQuery {
        self.query.default_query()
    }

    pub fn query_engine(&self) -> &QueryEngine<R> {
        &self.query
    }

    pub fn pagination_engine(&self) -> &QueryEngine<R> {
        &self.pagination
    }

    fn combined_default(&self) -> FlatQuery {
        self.pagination
            .converted_default()
            .over(self.query.converted_default())
    }

    fn write_with_page(&self, mut flat: FlatQuery, options: ChangeQueryOptions) -> RouterResult<()> {
        if options.reset_page {
            let page_default = self
                .pagination
                .convert(&PartialPagination::page(self.default_pagination.page).to_query());
            flat.extend(page_default);
        }
        debug!(
            keys = ?flat.keys().collect::<Vec<_>>(),
            reset_page = options.reset_page,
            "setting query"
        );
        self.query.router().set_query(&flat, &self.combined_default())
    }
}
