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

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component(pub)]
#[dill::interface(dyn SearchCatalogUseCase)]
pub struct SearchCatalogUseCaseImpl {
    rule_parser: Arc<dyn RuleParser>,
    search_service: Arc<dyn PaginatedSearchService>,
}

impl SearchCatalogUseCaseImpl {
    fn parse(&self, raw_groups: Vec<RawRuleGroup>) -> Result<Vec<RuleGroup>, SearchExecuteError> {
        self.rule_parser.parse(raw_groups).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse rule groups");
            e.into()
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl SearchCatalogUseCase for SearchCatalogUseCaseImpl {
    #[tracing::instrument(
        level = "info",
        name = "SearchCatalogUseCaseImpl_execute",
        skip_all,
        fields(num_groups = raw_groups.len(), ?page)
    )]
    async fn execute(
        &self,
        raw_groups: Vec<RawRuleGroup>,
        page: PageParams,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchExecuteError> {
        let rule_groups = self.parse(raw_groups)?;

        self.search_service
            .execute(rule_groups, page, options)
            .await
    }

    #[tracing::instrument(
        level = "info",
        name = "SearchCatalogUseCaseImpl_count",
        skip_all,
        fields(num_groups = raw_groups.len())
    )]
    async fn count(
        &self,
        raw_groups: Vec<RawRuleGroup>,
        availability_filter: Option<AvailabilityFilter>,
    ) -> Result<Vec<EntityCount>, SearchExecuteError> {
        let rule_groups = self.parse(raw_groups)?;

        self.search_service
            .count_matches(rule_groups, availability_filter)
            .await
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
