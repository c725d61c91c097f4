// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Document store holding catalog entities as JSON documents
#[cfg_attr(any(feature = "testing", test), mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns matching documents ordered by `request.sort`
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<serde_json::Value>, InternalError>;

    async fn count(
        &self,
        entity_type: &str,
        predicate: &SearchFilterExpr,
    ) -> Result<u64, InternalError>;

    /// Sums prices of matching documents per (currency, price type)
    async fn aggregate_prices(
        &self,
        entity_type: &str,
        predicate: &SearchFilterExpr,
    ) -> Result<Vec<AggregatedPrice>, InternalError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub entity_type: String,
    pub predicate: SearchFilterExpr,

    /// Fields to return, empty means the whole document
    pub projection: Vec<FieldProjection>,

    pub sort: SortSpec,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SearchFieldPath,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<SearchFieldPath>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
