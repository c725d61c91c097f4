// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::Cursor;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Navigation cursors of a fetched page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageCursors {
    pub next: Option<Cursor>,
    pub prev: Option<Cursor>,
}

impl PageCursors {
    /// Derives cursors from the page boundary rows and the anchors of the walk.
    ///
    /// An unknown anchor falls back to the page's own boundary row, which
    /// closes the walk in that direction.
    pub fn compute(
        page_bounds: Option<(&str, &str)>,
        first_anchor: Option<&str>,
        last_anchor: Option<&str>,
        is_first_request: bool,
    ) -> Self {
        let Some((first_row, last_row)) = page_bounds else {
            return Self::default();
        };

        let first_anchor = first_anchor.unwrap_or(first_row);
        let last_anchor = last_anchor.unwrap_or(last_row);

        let next = (last_row != last_anchor)
            .then(|| Cursor::forward(first_anchor, last_anchor, last_row));

        let prev = (!is_first_request && first_row != first_anchor)
            .then(|| Cursor::backward(first_anchor, last_anchor, first_row));

        Self { next, prev }
    }

    pub fn is_first_page(&self) -> bool {
        self.prev.is_none()
    }

    pub fn is_last_page(&self) -> bool {
        self.next.is_none()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
