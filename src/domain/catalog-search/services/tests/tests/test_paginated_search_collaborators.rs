// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;
use std::time::Duration;

use catalog_search::*;
use catalog_search_inmem::{InMemoryCatalogStore, InMemoryMediaLookup};
use catalog_search_services::PaginatedSearchServiceImpl;
use dill::{Catalog, CatalogBuilder};
use internal_error::InternalError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Barrier;

use super::utils::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_first_request_probes_last_anchor_once() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .withf(|r| {
            r.sort.direction == SortDirection::Asc
                && r.offset == 0
                && r.limit == 10
                && r.predicate == SearchFilterExpr::MatchAll
        })
        .times(1)
        .returning(|_| Ok(rows(1..=10)));
    store
        .expect_fetch()
        .withf(|r| {
            r.sort == SortSpec::new("id", SortDirection::Desc)
                && r.limit == 1
                && r.projection == ["id"]
        })
        .times(1)
        .returning(|_| Ok(rows([23])));
    store.expect_count().never();
    store.expect_aggregate_prices().never();

    let harness = MockedSearchHarness::with_mock_store(store);

    let result = harness.search_products(PageParams::first(10)).await.unwrap();

    assert_eq!(result.item_ids("id"), product_ids(1..=10));
    assert_eq!(result.next_cursor.as_deref(), Some("p01:p23:p10_asc"));
    assert_eq!(result.prev_cursor, None);
}

#[test_log::test(tokio::test)]
async fn test_cursor_request_issues_no_probes() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .withf(|r| {
            r.sort.direction == SortDirection::Asc
                && r.limit == 10
                && r.predicate
                    == filter_and!(SearchFilterExpr::MatchAll, field_gt_str("id", "p10"))
        })
        .times(1)
        .returning(|_| Ok(rows(11..=20)));

    let harness = MockedSearchHarness::with_mock_store(store);

    let result = harness
        .search_products(PageParams::at_cursor("p01:p23:p10_asc", 10))
        .await
        .unwrap();

    assert_eq!(result.item_ids("id"), product_ids(11..=20));
    assert_eq!(result.next_cursor.as_deref(), Some("p01:p23:p20_asc"));
    assert_eq!(result.prev_cursor.as_deref(), Some("p01:p23:p11_desc"));
}

#[test_log::test(tokio::test)]
async fn test_cursor_without_position_skips_fetching() {
    let mut store = MockCatalogStore::new();
    store.expect_fetch().never();
    store.expect_count().never();

    let harness = MockedSearchHarness::with_mock_store(store);

    let result = harness
        .search_products(PageParams::at_cursor("p01:p23:null_asc", 10))
        .await
        .unwrap();

    assert!(result.items.is_empty());
    assert_eq!(result.next_cursor, None);
    assert_eq!(result.prev_cursor, None);
}

#[test_log::test(tokio::test)]
async fn test_backward_cursor_fetches_descending() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .withf(|r| {
            r.sort.direction == SortDirection::Desc
                && r.limit == 10
                && r.predicate
                    == filter_and!(SearchFilterExpr::MatchAll, field_lt_str("id", "p11"))
        })
        .times(1)
        .returning(|_| Ok(rows((1..=10).rev())));

    let harness = MockedSearchHarness::with_mock_store(store);

    let result = harness
        .search_products(PageParams::at_cursor("p01:p23:p11_desc", 10))
        .await
        .unwrap();

    assert_eq!(result.item_ids("id"), product_ids(1..=10));
    assert_eq!(result.prev_cursor, None);
    assert!(result.is_first_page);
}

#[test_log::test(tokio::test)]
async fn test_last_page_counts_before_fetching() {
    let mut seq = mockall::Sequence::new();

    let mut store = MockCatalogStore::new();
    store
        .expect_count()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(23));
    store
        .expect_fetch()
        .withf(|r| r.sort.direction == SortDirection::Desc && r.limit == 3)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(rows([23, 22, 21])));
    store
        .expect_fetch()
        .withf(|r| r.sort.direction == SortDirection::Asc && r.limit == 1)
        .times(1)
        .returning(|_| Ok(rows([1])));

    let harness = MockedSearchHarness::with_mock_store(store);

    let result = harness
        .search_products(PageParams::at_cursor("last", 10))
        .await
        .unwrap();

    assert_eq!(result.item_ids("id"), product_ids(21..=23));
    assert_eq!(result.prev_cursor.as_deref(), Some("p01:p23:p21_desc"));
    assert!(result.is_last_page);
}

#[test_log::test(tokio::test)]
async fn test_offset_request_probes_both_anchors() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .withf(|r| r.offset == 5 && r.limit == 5)
        .times(1)
        .returning(|_| Ok(rows(6..=10)));
    store
        .expect_fetch()
        .withf(|r| r.sort.direction == SortDirection::Asc && r.offset == 0 && r.limit == 1)
        .times(1)
        .returning(|_| Ok(rows([1])));
    store
        .expect_fetch()
        .withf(|r| r.sort.direction == SortDirection::Desc && r.offset == 0 && r.limit == 1)
        .times(1)
        .returning(|_| Ok(rows([23])));

    let harness = MockedSearchHarness::with_mock_store(store);

    let result = harness
        .search_products(PageParams::at_offset(5, 5))
        .await
        .unwrap();

    assert_eq!(result.prev_cursor.as_deref(), Some("p01:p23:p06_desc"));
    assert_eq!(result.next_cursor.as_deref(), Some("p01:p23:p10_asc"));
}

#[test_log::test(tokio::test)]
async fn test_group_sub_queries_run_concurrently() {
    // Main fetch, both anchor probes, count and prices
    let harness = MockedSearchHarness::with_gated_store(GatedCatalogStore::new(5));

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        harness.search_service.execute(
            vec![products_group()],
            PageParams::at_offset(5, 5),
            SearchOptions {
                want_counts: true,
                want_prices: true,
                ..Default::default()
            },
        ),
    )
    .await
    .expect("sub-queries of a group were not issued together")
    .unwrap();

    assert_eq!(result.item_ids("id"), product_ids(6..=10));
    assert_eq!(result.prev_cursor.as_deref(), Some("p01:p23:p06_desc"));
    assert_eq!(result.next_cursor.as_deref(), Some("p01:p23:p10_asc"));
}

#[test_log::test(tokio::test)]
async fn test_rule_groups_run_concurrently() {
    // Main fetch and last anchor probe of two groups
    let harness = MockedSearchHarness::with_gated_store(GatedCatalogStore::new(4));

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        harness.search(
            vec![products_group(), bundles_group()],
            PageParams::first(5),
        ),
    )
    .await
    .expect("rule groups were not executed together")
    .unwrap();

    assert_eq!(result.groups.len(), 2);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_main_fetch_failure() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .withf(|r| r.limit == 10)
        .returning(|_| Err(store_failure()));
    store
        .expect_fetch()
        .withf(|r| r.limit == 1)
        .returning(|_| Ok(rows([23])));

    let harness = MockedSearchHarness::with_mock_store(store);

    let res = harness.search_products(PageParams::first(10)).await;

    assert!(matches!(res, Err(SearchExecuteError::Internal(_))));
}

#[test_log::test(tokio::test)]
async fn test_probe_failure() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .withf(|r| r.limit == 10)
        .returning(|_| Ok(rows(1..=10)));
    store
        .expect_fetch()
        .withf(|r| r.limit == 1)
        .returning(|_| Err(store_failure()));

    let harness = MockedSearchHarness::with_mock_store(store);

    let res = harness.search_products(PageParams::first(10)).await;

    assert!(matches!(res, Err(SearchExecuteError::Internal(_))));
}

#[test_log::test(tokio::test)]
async fn test_count_failure() {
    let mut store = MockCatalogStore::new();
    store.expect_fetch().returning(|_| Ok(rows([1])));
    store
        .expect_count()
        .returning(|_, _| Err(store_failure()));

    let harness = MockedSearchHarness::with_mock_store(store);

    let res = harness
        .search_service
        .execute(
            vec![products_group()],
            PageParams::first(10),
            SearchOptions {
                want_counts: true,
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(&res, Err(SearchExecuteError::Internal(_))));
    assert!(!res.unwrap_err().is_client_error());
}

#[test_log::test(tokio::test)]
async fn test_price_failure() {
    let mut store = MockCatalogStore::new();
    store.expect_fetch().returning(|_| Ok(rows([1])));
    store
        .expect_aggregate_prices()
        .returning(|_, _| Err(store_failure()));

    let harness = MockedSearchHarness::with_mock_store(store);

    let res = harness
        .search_service
        .execute(
            vec![products_group()],
            PageParams::first(10),
            SearchOptions {
                want_prices: true,
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(res, Err(SearchExecuteError::Internal(_))));
}

#[test_log::test(tokio::test)]
async fn test_documents_without_id_are_internal_errors() {
    let mut store = MockCatalogStore::new();
    store
        .expect_fetch()
        .returning(|_| Ok(vec![json!({"name": "nameless"})]));

    let harness = MockedSearchHarness::with_mock_store(store);

    let res = harness.search_products(PageParams::first(10)).await;

    assert!(matches!(res, Err(SearchExecuteError::Internal(_))));
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_media_lookup_is_batched_across_groups() {
    let store = InMemoryCatalogStore::new();
    store
        .upsert_many("product", (1..=2).map(product))
        .await
        .unwrap();
    store.upsert("bundle", bundle(1)).await.unwrap();

    let mut media_lookup = MockMediaLookup::new();
    media_lookup
        .expect_find_by_entity_ids()
        .withf(|ids| ids.join(",") == "b01,p01,p02")
        .times(1)
        .returning(|_| {
            Ok(vec![
                MediaRecord::new("p01", json!({"url": "p01.png", "size": 10})),
                MediaRecord::new("b01", json!({"url": "b01.png", "size": 20})),
            ])
        });

    let harness = MockedSearchHarness::with_mock_media(store, media_lookup);

    let result = harness
        .search_service
        .execute(
            vec![
                products_group().with_attributes(["media.url"]),
                bundles_group().with_attributes(["media.*"]),
            ],
            PageParams::first(10),
            SearchOptions::default(),
        )
        .await
        .unwrap();

    let entities = result
        .items
        .into_iter()
        .map(|item| item.entity)
        .collect::<Vec<_>>();

    assert_eq!(
        entities,
        vec![
            json!({"id": "p01", "media": [{"url": "p01.png"}]}),
            json!({"id": "p02", "media": []}),
            json!({"id": "b01", "media": [{"url": "b01.png", "size": 20}]}),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_media_lookup_failure() {
    let store = InMemoryCatalogStore::new();
    store.upsert("product", product(1)).await.unwrap();

    let mut media_lookup = MockMediaLookup::new();
    media_lookup
        .expect_find_by_entity_ids()
        .returning(|_| Err(store_failure()));

    let harness = MockedSearchHarness::with_mock_media(store, media_lookup);

    let res = harness
        .search(
            vec![products_group().with_attributes(["media.url"])],
            PageParams::first(10),
        )
        .await;

    assert!(matches!(res, Err(SearchExecuteError::Internal(_))));
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Harness
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn rows(ns: impl IntoIterator<Item = usize>) -> Vec<serde_json::Value> {
    ns.into_iter()
        .map(|n| json!({"id": product_id(n)}))
        .collect()
}

fn store_failure() -> InternalError {
    InternalError::new("catalog store is unavailable")
}

/// Holds every call until `num_calls` calls are in flight at once
struct GatedCatalogStore {
    gate: Barrier,
}

impl GatedCatalogStore {
    fn new(num_calls: usize) -> Self {
        Self {
            gate: Barrier::new(num_calls),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for GatedCatalogStore {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<serde_json::Value>, InternalError> {
        self.gate.wait().await;

        Ok(match (request.limit, request.sort.direction) {
            (1, SortDirection::Asc) => rows([1]),
            (1, SortDirection::Desc) => rows([23]),
            _ => rows((request.offset + 1..).take(request.limit)),
        })
    }

    async fn count(
        &self,
        _entity_type: &str,
        _predicate: &SearchFilterExpr,
    ) -> Result<u64, InternalError> {
        self.gate.wait().await;
        Ok(23)
    }

    async fn aggregate_prices(
        &self,
        _entity_type: &str,
        _predicate: &SearchFilterExpr,
    ) -> Result<Vec<AggregatedPrice>, InternalError> {
        self.gate.wait().await;
        Ok(Vec::new())
    }
}

struct MockedSearchHarness {
    _catalog: Catalog,
    search_service: Arc<dyn PaginatedSearchService>,
}

impl MockedSearchHarness {
    fn with_mock_store(catalog_store: MockCatalogStore) -> Self {
        let mut b = CatalogBuilder::new();

        b.add_value(catalog_store);
        b.bind::<dyn CatalogStore, MockCatalogStore>();
        b.add::<InMemoryMediaLookup>();

        Self::build(b)
    }

    fn with_gated_store(catalog_store: GatedCatalogStore) -> Self {
        let mut b = CatalogBuilder::new();

        b.add_value(catalog_store);
        b.bind::<dyn CatalogStore, GatedCatalogStore>();
        b.add::<InMemoryMediaLookup>();

        Self::build(b)
    }

    fn with_mock_media(catalog_store: InMemoryCatalogStore, media_lookup: MockMediaLookup) -> Self {
        let mut b = CatalogBuilder::new();

        b.add_value(catalog_store);
        b.bind::<dyn CatalogStore, InMemoryCatalogStore>();
        b.add_value(media_lookup);
        b.bind::<dyn MediaLookup, MockMediaLookup>();

        Self::build(b)
    }

    fn build(mut b: CatalogBuilder) -> Self {
        b.add::<PaginatedSearchServiceImpl>();
        b.add_value(PaginatedSearchConfig::default());

        let catalog = b.build();

        Self {
            search_service: catalog.get_one().unwrap(),
            _catalog: catalog,
        }
    }

    async fn search(
        &self,
        rule_groups: Vec<RuleGroup>,
        page: PageParams,
    ) -> Result<SearchResult, SearchExecuteError> {
        self.search_service
            .execute(rule_groups, page, SearchOptions::default())
            .await
    }

    async fn search_products(&self, page: PageParams) -> Result<SearchResult, SearchExecuteError> {
        self.search(vec![products_group()], page).await
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
