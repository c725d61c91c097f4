// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use catalog_search::*;
use catalog_search_inmem::{InMemoryCatalogStore, InMemoryMediaLookup, JsonRuleParser};
use catalog_search_services::SearchCatalogUseCaseImpl;
use dill::{Catalog, CatalogBuilder};
use internal_error::InternalError;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::utils::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_executes_parsed_rules() {
    let harness = SearchCatalogUseCaseHarness::with_catalog_data().await;

    let result = harness
        .use_case
        .execute(
            raw_groups(json!([{
                "entityType": "product",
                "rules": {"field": {"field": "brand", "op": {"eq": "acme"}}},
                "attributes": ["name"]
            }])),
            PageParams::first(5),
            SearchOptions {
                want_counts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(result.item_ids("id"), product_ids([1, 3, 5, 7, 9]));
    assert_eq!(result.next_cursor.as_deref(), Some("p01:p23:p09_asc"));
    assert_eq!(
        result.counts,
        Some(vec![EntityCount::new("product", 12), EntityCount::new("Total", 12)])
    );
    assert_eq!(
        result.items[0].entity,
        json!({"id": "p01", "name": "Product 1"})
    );
}

#[test_log::test(tokio::test)]
async fn test_counts_parsed_rules() {
    let harness = SearchCatalogUseCaseHarness::with_catalog_data().await;

    let counts = harness
        .use_case
        .count(
            raw_groups(json!([
                {"entityType": "product"},
                {"entityType": "bundle"},
            ])),
            Some(AvailabilityFilter::single("pos", ["active"])),
        )
        .await
        .unwrap();

    assert_eq!(
        counts,
        vec![
            EntityCount::new("product", 7),
            EntityCount::new("bundle", 0),
            EntityCount::new("Total", 7),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_count_without_matches() {
    let harness = SearchCatalogUseCaseHarness::with_catalog_data().await;

    let res = harness
        .use_case
        .count(
            raw_groups(json!([{
                "entityType": "bundle",
                "rules": {"field": {"field": "brand", "op": {"eq": "acme"}}}
            }])),
            None,
        )
        .await;

    assert!(matches!(
        res,
        Err(SearchExecuteError::NotFound(NoMatchesError { counts }))
            if counts == vec![EntityCount::new("bundle", 0), EntityCount::new("Total", 0)]
    ));
}

#[test_log::test(tokio::test)]
async fn test_malformed_rules_are_invalid_queries() {
    let harness = SearchCatalogUseCaseHarness::with_catalog_data().await;

    for groups in [
        json!([{"rules": null}]),
        json!([{"entityType": "product", "rules": {"field": {"field": "brand"}}}]),
        json!([{"entityType": "product"}, {"entityType": "bundle", "rules": 42}]),
    ] {
        let res = harness
            .use_case
            .execute(raw_groups(groups), PageParams::first(10), SearchOptions::default())
            .await;

        let err = res.unwrap_err();
        assert!(matches!(err, SearchExecuteError::InvalidQuery(_)), "{err:?}");
        assert!(err.is_client_error());
    }
}

#[test_log::test(tokio::test)]
async fn test_parser_failure_skips_the_search() {
    let mut rule_parser = MockRuleParser::new();
    rule_parser.expect_parse().times(1).returning(|_| {
        Err(RuleParseError::Internal(InternalError::new(
            "rule dictionary is unavailable",
        )))
    });

    let mut search_service = MockPaginatedSearchService::new();
    search_service.expect_execute().never();

    let harness = SearchCatalogUseCaseHarness::with_mocks(rule_parser, search_service);

    let res = harness
        .use_case
        .execute(
            raw_groups(json!([{"entityType": "product"}])),
            PageParams::first(10),
            SearchOptions::default(),
        )
        .await;

    assert!(matches!(res, Err(SearchExecuteError::Internal(_))));
}

#[test_log::test(tokio::test)]
async fn test_passes_parsed_groups_through() {
    let mut rule_parser = MockRuleParser::new();
    rule_parser
        .expect_parse()
        .withf(|raw| raw.len() == 1 && raw[0].entity_type.as_deref() == Some("product"))
        .returning(|_| Ok(vec![products_group()]));

    let mut search_service = MockPaginatedSearchService::new();
    search_service
        .expect_count_matches()
        .withf(|groups, filter| {
            *groups == vec![products_group()]
                && *filter == Some(AvailabilityFilter::single("web", ["visible"]))
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                EntityCount::new("product", 1),
                EntityCount::new("Total", 1),
            ])
        });

    let harness = SearchCatalogUseCaseHarness::with_mocks(rule_parser, search_service);

    let counts = harness
        .use_case
        .count(
            raw_groups(json!([{"entityType": "product"}])),
            Some(AvailabilityFilter::single("web", ["visible"])),
        )
        .await
        .unwrap();

    assert_eq!(counts.len(), 2);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Harness
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn raw_groups(value: serde_json::Value) -> Vec<RawRuleGroup> {
    serde_json::from_value(value).unwrap()
}

struct SearchCatalogUseCaseHarness {
    _catalog: Catalog,
    use_case: Arc<dyn SearchCatalogUseCase>,
}

impl SearchCatalogUseCaseHarness {
    async fn with_catalog_data() -> Self {
        let mut b = CatalogBuilder::new();

        b.add::<InMemoryCatalogStore>();
        b.add::<InMemoryMediaLookup>();
        b.add::<JsonRuleParser>();
        b.add_value(PaginatedSearchConfig::default());

        catalog_search_services::register_dependencies(&mut b);

        let catalog = b.build();

        let store = catalog.get_one::<InMemoryCatalogStore>().unwrap();
        store
            .upsert_many("product", (1..=NUM_PRODUCTS).map(product))
            .await
            .unwrap();
        store
            .upsert_many("bundle", (1..=NUM_BUNDLES).map(bundle))
            .await
            .unwrap();

        Self {
            use_case: catalog.get_one().unwrap(),
            _catalog: catalog,
        }
    }

    fn with_mocks(rule_parser: MockRuleParser, search_service: MockPaginatedSearchService) -> Self {
        let mut b = CatalogBuilder::new();

        b.add_value(rule_parser);
        b.bind::<dyn RuleParser, MockRuleParser>();
        b.add_value(search_service);
        b.bind::<dyn PaginatedSearchService, MockPaginatedSearchService>();
        b.add::<SearchCatalogUseCaseImpl>();

        let catalog = b.build();

        Self {
            use_case: catalog.get_one().unwrap(),
            _catalog: catalog,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
