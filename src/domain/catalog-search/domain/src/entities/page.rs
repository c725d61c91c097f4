// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::AvailabilityFilter;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Requested page window. Offset and cursor are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default)]
    pub offset: Option<usize>,

    /// Encoded cursor of a previous response or the last page sentinel
    #[serde(default)]
    pub cursor: Option<String>,

    pub limit: usize,
}

impl PageParams {
    pub fn first(limit: usize) -> Self {
        Self {
            offset: None,
            cursor: None,
            limit,
        }
    }

    pub fn at_offset(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            cursor: None,
            limit,
        }
    }

    pub fn at_cursor(cursor: impl Into<String>, limit: usize) -> Self {
        Self {
            offset: None,
            cursor: Some(cursor.into()),
            limit,
        }
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or_default()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default)]
    pub want_counts: bool,

    #[serde(default)]
    pub want_prices: bool,

    #[serde(default)]
    pub availability_filter: Option<AvailabilityFilter>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
