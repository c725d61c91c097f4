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

/// Reduces caller-facing rule trees to per-entity-type predicates
#[cfg_attr(any(feature = "testing", test), mockall::automock)]
pub trait RuleParser: Send + Sync {
    fn parse(&self, raw_groups: Vec<RawRuleGroup>) -> Result<Vec<RuleGroup>, RuleParseError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, thiserror::Error)]
pub enum RuleParseError {
    #[error(transparent)]
    Malformed(#[from] MalformedRuleError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed rules of rule group #{group_index}: {reason}")]
pub struct MalformedRuleError {
    pub group_index: usize,
    pub reason: String,
}

impl From<RuleParseError> for SearchExecuteError {
    fn from(e: RuleParseError) -> Self {
        match e {
            RuleParseError::Malformed(e) => Self::invalid_query(e.to_string()),
            RuleParseError::Internal(e) => Self::Internal(e),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
