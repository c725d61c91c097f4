// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod dependencies;
mod page_cursors;
mod paginated_search_service_impl;
mod price_aggregation;
mod search_catalog_use_case_impl;

pub use dependencies::*;
pub use page_cursors::*;
pub use paginated_search_service_impl::*;
pub use price_aggregation::*;
pub use search_catalog_use_case_impl::*;
