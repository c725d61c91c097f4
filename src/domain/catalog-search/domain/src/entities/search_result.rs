// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::AvailabilityEntry;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub entity_type: String,

    /// Projected document
    pub entity: serde_json::Value,

    pub availability: Vec<AvailabilityEntry>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCount {
    pub entity_type: String,
    pub count: u64,
}

impl EntityCount {
    pub fn new(entity_type: impl Into<String>, count: u64) -> Self {
        Self {
            entity_type: entity_type.into(),
            count,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPrice {
    pub currency: String,
    pub price_type_code: String,
    pub price: f64,
    pub products_count: u64,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Page of a single rule group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    pub entity_type: String,
    pub items: Vec<SearchItem>,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
    pub is_first_page: bool,
    pub is_last_page: bool,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Items of all groups in submission order, each group ascending by id
    pub items: Vec<SearchItem>,

    /// Per entity type counts followed by the total
    pub counts: Option<Vec<EntityCount>>,

    pub prices: Option<Vec<AggregatedPrice>>,

    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
    pub is_first_page: bool,
    pub is_last_page: bool,

    pub groups: Vec<GroupPage>,
}

impl SearchResult {
    pub fn item_ids(&self, id_field: &str) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| item.entity.get(id_field).and_then(serde_json::Value::as_str))
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
