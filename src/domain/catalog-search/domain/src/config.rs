// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;
pub const DEFAULT_PRICE_PRECISION: u32 = 2;

pub const DEFAULT_ID_FIELD: &str = "id";
pub const DEFAULT_AVAILABILITY_FIELD: &str = "availability";
pub const DEFAULT_MEDIA_FIELD: &str = "media";
pub const DEFAULT_LAST_PAGE_SENTINEL: &str = "last";
pub const DEFAULT_TOTAL_COUNT_LABEL: &str = "Total";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct PaginatedSearchConfig {
    /// Upper bound for the requested page size
    pub max_page_size: usize,

    /// Number of decimal places aggregated prices are rounded to
    pub price_precision: u32,

    /// Unique, totally ordered field used both as identifier and as sort key
    pub id_field: String,

    /// Array field holding `{name, status}` availability entries
    pub availability_field: String,

    /// Projection prefix that triggers the associated media join
    pub media_field: String,

    /// Reserved cursor value requesting the last page
    pub last_page_sentinel: String,

    /// Entity type label of the summed count entry
    pub total_count_label: String,
}

impl PaginatedSearchConfig {
    pub fn new(max_page_size: usize, price_precision: u32) -> Self {
        Self {
            max_page_size,
            price_precision,
            ..Default::default()
        }
    }
}

impl Default for PaginatedSearchConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            price_precision: DEFAULT_PRICE_PRECISION,
            id_field: DEFAULT_ID_FIELD.to_string(),
            availability_field: DEFAULT_AVAILABILITY_FIELD.to_string(),
            media_field: DEFAULT_MEDIA_FIELD.to_string(),
            last_page_sentinel: DEFAULT_LAST_PAGE_SENTINEL.to_string(),
            total_count_label: DEFAULT_TOTAL_COUNT_LABEL.to_string(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
