//! Integration tests for the query and pagination engines

use chrono::TimeZone;
use parking_lot::RwLock;
use proptest::prelude::*;
use querysync_core::{
    merge_partial, AbstractQuery, ChangeQueryOptions, FieldKind, FlatQuery, FlatValue,
    PaginatedQuery, Pagination, PartialPagination, QueryEngine, QueryOptions, Router, RouterError,
    RouterResult, Schema,
};
use querysync_types::{BigInt, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A bare store that counts writes
#[derive(Default)]
struct CountingRouter {
    live: RwLock<FlatQuery>,
    writes: AtomicUsize,
}

impl CountingRouter {
    fn with(live: FlatQuery) -> Self {
        Self {
            live: RwLock::new(live),
            writes: AtomicUsize::new(0),
        }
    }

    fn live(&self) -> FlatQuery {
        self.live.read().clone()
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Router for CountingRouter {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        self.live.read().over(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        merge_partial(&mut self.live.write(), query, default_query);
        Ok(())
    }
}

struct FailingRouter;

impl Router for FailingRouter {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        default_query.clone()
    }

    fn set_query(&self, _query: &FlatQuery, _default_query: &FlatQuery) -> RouterResult<()> {
        Err(RouterError::Navigation("offline".into()))
    }
}

fn search_schema() -> Schema {
    Schema::new()
        .field("search", FieldKind::string())
        .field("department", FieldKind::string())
}

fn search_defaults() -> AbstractQuery {
    AbstractQuery::new().with("search", "").with("department", "")
}

fn paginated(router: &CountingRouter) -> PaginatedQuery<&CountingRouter> {
    PaginatedQuery::new(
        router,
        search_schema(),
        search_defaults(),
        PartialPagination::default(),
        QueryOptions::default(),
    )
}

fn search(value: &str) -> AbstractQuery {
    AbstractQuery::new().with("search", value)
}

#[test]
fn test_initial_pagination_defaults() {
    let router = CountingRouter::default();
    let list = PaginatedQuery::pagination_only(&router, PartialPagination::default(), QueryOptions::default());

    assert_eq!(list.page(), 0);
    assert_eq!(list.size(), 15);
    assert!(list.query().is_empty());
}

#[test]
fn test_custom_default_pagination() {
    let router = CountingRouter::default();
    let list = PaginatedQuery::pagination_only(
        &router,
        Pagination::new(1, 10).into(),
        QueryOptions::default(),
    );

    assert_eq!(list.pagination(), Pagination::new(1, 10));
}

#[test]
fn test_set_page_then_change_query_resets_page() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_page(2).unwrap();
    assert_eq!(list.page(), 2);
    assert_eq!(router.live().get("page"), Some(&FlatValue::from("2")));

    list.set_query(&search("Max"), ChangeQueryOptions::default())
        .unwrap();

    assert_eq!(list.page(), 0);
    assert!(!router.live().contains_key("page"));
    assert_eq!(router.live().get("search"), Some(&FlatValue::from("Max")));
    assert_eq!(list.query().get_str("search"), Some("Max"));
}

#[test]
fn test_keep_page_suppresses_reset() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_page(2).unwrap();
    list.set_query(&search("Max"), ChangeQueryOptions::keep_page())
        .unwrap();
    assert_eq!(list.page(), 2);

    list.reset_query(ChangeQueryOptions::keep_page()).unwrap();
    assert_eq!(list.query().get_str("search"), Some(""));
    assert_eq!(list.page(), 2);
}

#[test]
fn test_query_change_and_page_reset_share_one_write() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_page(3).unwrap();
    let before = router.writes();

    list.set_query(&search("Max"), ChangeQueryOptions::default())
        .unwrap();
    assert_eq!(router.writes(), before + 1);

    list.reset_query(ChangeQueryOptions::default()).unwrap();
    assert_eq!(router.writes(), before + 2);

    list.reset_query_and_pagination().unwrap();
    assert_eq!(router.writes(), before + 3);
}

#[test]
fn test_reset_pagination_leaves_query_alone() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_query(&search("Max"), ChangeQueryOptions::default())
        .unwrap();
    list.set_page(2).unwrap();
    list.set_size(50).unwrap();

    list.reset_pagination().unwrap();

    assert_eq!(list.query().get_str("search"), Some("Max"));
    assert_eq!(list.pagination(), Pagination::default());
    assert_eq!(router.live(), FlatQuery::new().with("search", "Max"));
}

#[test]
fn test_reset_query_resets_page_but_not_size() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_query(&search("Max"), ChangeQueryOptions::default())
        .unwrap();
    list.set_pagination(PartialPagination {
        page: Some(4),
        size: Some(30),
    })
    .unwrap();

    list.reset_query(ChangeQueryOptions::default()).unwrap();

    assert_eq!(list.query().get_str("search"), Some(""));
    assert_eq!(list.page(), 0);
    assert_eq!(list.size(), 30);
}

#[test]
fn test_set_page_and_size_are_independent() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_size(30).unwrap();
    list.set_page(5).unwrap();

    assert_eq!(list.pagination(), Pagination::new(5, 30));

    list.set_page(0).unwrap();
    assert_eq!(list.size(), 30);
    assert_eq!(router.live(), FlatQuery::new().with("size", "30"));
}

#[test]
fn test_reset_query_and_pagination() {
    let router = CountingRouter::with(FlatQuery::new().with("greeting", "hello"));
    let list = paginated(&router);

    list.set_query(
        &AbstractQuery::new()
            .with("search", "Max")
            .with("department", "IT"),
        ChangeQueryOptions::default(),
    )
    .unwrap();
    list.set_pagination(Pagination::new(3, 40).into()).unwrap();

    list.reset_query_and_pagination().unwrap();

    assert_eq!(list.query(), search_defaults());
    assert_eq!(list.pagination(), Pagination::default());
    assert_eq!(router.live(), FlatQuery::new().with("greeting", "hello"));
}

#[test]
fn test_foreign_keys_survive_writes() {
    let router = CountingRouter::with(FlatQuery::new().with("greeting", "hello"));
    let engine = QueryEngine::new(&router, search_schema(), search_defaults(), QueryOptions::default());

    engine.set_query(&search("Max")).unwrap();
    engine.reset_query().unwrap();

    assert_eq!(router.live(), FlatQuery::new().with("greeting", "hello"));
}

#[test]
fn test_sequential_sets_do_not_clobber() {
    let router = CountingRouter::default();
    let engine = QueryEngine::new(&router, search_schema(), search_defaults(), QueryOptions::default());

    engine.set_query(&search("Max")).unwrap();
    engine
        .set_query(&AbstractQuery::new().with("department", "IT"))
        .unwrap();

    let query = engine.query();
    assert_eq!(query.get_str("search"), Some("Max"));
    assert_eq!(query.get_str("department"), Some("IT"));
}

#[test]
fn test_default_merge_completeness() {
    let router = CountingRouter::with(FlatQuery::new().with("search", "Max"));
    let engine = QueryEngine::new(&router, search_schema(), search_defaults(), QueryOptions::default());

    let query = engine.query();
    assert_eq!(query.get_str("search"), Some("Max"));
    assert_eq!(query.get_str("department"), Some(""));
}

#[test]
fn test_partial_defaults_leave_other_keys_missing() {
    let router = CountingRouter::default();
    let engine = QueryEngine::new(
        &router,
        search_schema(),
        AbstractQuery::new().with("department", "IT"),
        QueryOptions::default(),
    );

    let query = engine.query();
    assert_eq!(query.get_str("department"), Some("IT"));
    assert!(query.get("search").is_none());
}

#[test]
fn test_non_empty_default_can_be_overridden_with_empty_string() {
    let router = CountingRouter::default();
    let engine = QueryEngine::new(
        &router,
        search_schema(),
        AbstractQuery::new().with("search", "Default search"),
        QueryOptions::default(),
    );

    engine.set_query(&search("")).unwrap();

    assert_eq!(engine.query().get_str("search"), Some(""));
    assert_eq!(router.live().get("search"), Some(&FlatValue::from("")));
}

#[test]
fn test_sibling_engines_share_a_store() {
    let router = CountingRouter::default();
    let filters = QueryEngine::new(&router, search_schema(), search_defaults(), QueryOptions::default());
    let sort = QueryEngine::new(
        &router,
        Schema::new().field("sort", FieldKind::string()),
        AbstractQuery::new().with("sort", "name"),
        QueryOptions::default(),
    );

    filters.set_query(&search("Max")).unwrap();
    sort.set_query(&AbstractQuery::new().with("sort", "age")).unwrap();
    sort.reset_query().unwrap();

    assert_eq!(filters.query().get_str("search"), Some("Max"));
    assert_eq!(sort.query().get_str("sort"), Some("name"));
}

#[test]
fn test_navigation_failure_is_surfaced() {
    let list = PaginatedQuery::pagination_only(&FailingRouter, PartialPagination::default(), QueryOptions::default());

    let err = list.set_page(2).unwrap_err();
    assert_eq!(err, RouterError::Navigation("offline".into()));
    assert_eq!(list.page(), 0);
}

#[test]
fn test_malformed_pagination_reads_as_default() {
    let router = CountingRouter::with(FlatQuery::new().with("page", "two").with("size", "-5"));
    let list = paginated(&router);

    assert_eq!(list.pagination(), Pagination::default());
}

#[test]
fn test_large_page_is_stored_exactly() {
    let router = CountingRouter::default();
    let list = paginated(&router);

    list.set_page(9_007_199_254_740_993).unwrap();

    assert_eq!(
        router.live().get("page"),
        Some(&FlatValue::from("9007199254740993"))
    );
    assert_eq!(list.page(), 9_007_199_254_740_993);
}

#[test]
fn test_large_integer_field_round_trips() {
    let router = CountingRouter::default();
    let engine = QueryEngine::new(
        &router,
        Schema::new().field("id", FieldKind::integer()),
        AbstractQuery::new(),
        QueryOptions::default(),
    );

    engine
        .set_query(&AbstractQuery::new().with("id", i64::MAX - 1))
        .unwrap();

    assert_eq!(
        router.live().get("id"),
        Some(&FlatValue::from((i64::MAX - 1).to_string()))
    );
    assert_eq!(engine.query().get_i64("id"), Some(i64::MAX - 1));
}

#[test]
fn test_dates_and_big_integers_round_trip() {
    let router = CountingRouter::default();
    let engine = QueryEngine::new(
        &router,
        Schema::new()
            .field("since", FieldKind::date())
            .field("net_worth", FieldKind::bigint()),
        AbstractQuery::new(),
        QueryOptions::default(),
    );

    let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let net_worth: BigInt = "330596250786212389484463426546493779967".parse().unwrap();

    engine
        .set_query(
            &AbstractQuery::new()
                .with("since", since)
                .with("net_worth", net_worth.clone()),
        )
        .unwrap();

    assert_eq!(
        router.live(),
        FlatQuery::new()
            .with("since", "2024-03-01T12:30:00Z")
            .with("net_worth", "330596250786212389484463426546493779967")
    );

    let query = engine.query();
    assert_eq!(query.get_date("since"), Some(&since));
    assert_eq!(query.get_bigint("net_worth"), Some(&net_worth));
}

proptest! {
    #[test]
    fn prop_setting_default_removes_key(
        default in "[a-z]{0,8}",
        value in "[a-z]{0,8}",
    ) {
        let router = CountingRouter::default();
        let engine = QueryEngine::new(
            &router,
            search_schema(),
            AbstractQuery::new().with("search", default.as_str()),
            QueryOptions::default(),
        );

        engine.set_query(&search(&value)).unwrap();
        let query = engine.query();
        prop_assert_eq!(query.get_str("search"), Some(value.as_str()));
        prop_assert_eq!(router.live().contains_key("search"), value != default);

        engine.set_query(&search(&default)).unwrap();
        prop_assert!(!router.live().contains_key("search"));
        let query = engine.query();
        prop_assert_eq!(query.get_str("search"), Some(default.as_str()));
    }

    #[test]
    fn prop_page_round_trips(page in 0u64..10_000, size in 1u64..500) {
        let router = CountingRouter::default();
        let list = paginated(&router);

        list.set_pagination(Pagination::new(page, size).into()).unwrap();
        prop_assert_eq!(list.pagination(), Pagination::new(page, size));
        prop_assert_eq!(router.live().contains_key("page"), page != 0);
        prop_assert_eq!(router.live().contains_key("size"), size != 15);
    }
}
