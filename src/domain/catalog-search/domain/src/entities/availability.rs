// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Element of an entity's availability array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub name: String,
    #[serde(default)]
    pub status: Vec<String>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Restricts results to entities having matching availability entries.
///
/// Accepts two wire shapes:
/// - `{"name": "web", "status": ["active", "visible"]}`
/// - `[{"name": "web", "status": {"ALL": [...]}}, {"name": "pos", "status":
///   {"IN": [...]}}]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityFilter {
    /// An entry named `name` must carry every status of `status`
    Single { name: String, status: Vec<String> },

    /// Every condition must be satisfied by some availability entry
    Multi(Vec<AvailabilityCondition>),
}

impl AvailabilityFilter {
    pub fn single<S>(name: impl Into<String>, status: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        Self::Single {
            name: name.into(),
            status: status.into_iter().map(Into::into).collect(),
        }
    }

    /// Expresses the filter as a list of conditions. A single filter is
    /// equivalent to one `ALL` condition.
    pub fn conditions(&self) -> Vec<AvailabilityCondition> {
        match self {
            Self::Single { name, status } => vec![AvailabilityCondition {
                name: name.clone(),
                status: StatusMatch::All(status.clone()),
            }],
            Self::Multi(conditions) => conditions.clone(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCondition {
    pub name: String,
    pub status: StatusMatch,
}

impl AvailabilityCondition {
    pub fn all<S>(name: impl Into<String>, status: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            status: StatusMatch::All(status.into_iter().map(Into::into).collect()),
        }
    }

    pub fn any<S>(name: impl Into<String>, status: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            status: StatusMatch::In(status.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusMatch {
    /// Status array contains every listed status
    All(Vec<String>),
    /// Status array contains at least one listed status
    In(Vec<String>),
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
