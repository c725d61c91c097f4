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

/// Executes rule groups against the catalog store with keyset pagination
#[cfg_attr(any(feature = "testing", test), mockall::automock)]
#[async_trait::async_trait]
pub trait PaginatedSearchService: Send + Sync {
    async fn execute(
        &self,
        rule_groups: Vec<RuleGroup>,
        page: PageParams,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchExecuteError>;

    /// Counts matches per entity type plus the total. Fails with
    /// [`SearchExecuteError::NotFound`] when nothing matches.
    async fn count_matches(
        &self,
        rule_groups: Vec<RuleGroup>,
        availability_filter: Option<AvailabilityFilter>,
    ) -> Result<Vec<EntityCount>, SearchExecuteError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, thiserror::Error)]
pub enum SearchExecuteError {
    #[error(transparent)]
    InvalidQuery(#[from] InvalidQueryError),

    #[error(transparent)]
    NotFound(#[from] NoMatchesError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl SearchExecuteError {
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery(InvalidQueryError {
            reason: reason.into(),
        })
    }

    /// Whether the caller is responsible for the failure
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidQuery(_) | Self::NotFound(_) => true,
            Self::Internal(_) => false,
        }
    }
}

impl From<InvalidCursorError> for SearchExecuteError {
    fn from(e: InvalidCursorError) -> Self {
        Self::invalid_query(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid query: {reason}")]
pub struct InvalidQueryError {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No entities match the query")]
pub struct NoMatchesError {
    pub counts: Vec<EntityCount>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
