// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod availability;
mod cursor;
mod page;
mod rule_group;
mod search_result;

pub use availability::*;
pub use cursor::*;
pub use page::*;
pub use rule_group::*;
pub use search_result::*;
