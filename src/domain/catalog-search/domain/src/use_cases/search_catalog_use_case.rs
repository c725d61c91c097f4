// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Parses raw rule groups and runs them through the paginated search
#[async_trait::async_trait]
pub trait SearchCatalogUseCase: Send + Sync {
    async fn execute(
        &self,
        raw_groups: Vec<RawRuleGroup>,
        page: PageParams,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchExecuteError>;

    async fn count(
        &self,
        raw_groups: Vec<RawRuleGroup>,
        availability_filter: Option<AvailabilityFilter>,
    ) -> Result<Vec<EntityCount>, SearchExecuteError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
