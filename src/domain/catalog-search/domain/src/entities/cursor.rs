// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CatalogEntityId;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const ANCHOR_SEPARATOR: char = ':';
const DIRECTION_SEPARATOR: char = '_';
const ABSENT_POSITION: &str = "null";
// Id spelled like the absence marker, first letter percent-encoded
const ESCAPED_ABSENT_POSITION_ID: &str = "%6Eull";

// Bound for untrusted cursor input
const MAX_CURSOR_LEN: usize = 4 * 1024;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Keyset pagination state threaded through responses.
///
/// Anchors are the first and the last ids of the predicate's natural order,
/// learned once by probe queries and then carried by every cursor derived from
/// that walk. Serialized form: `first:last:position_direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub first_anchor: CatalogEntityId,
    pub last_anchor: CatalogEntityId,
    /// `None` means there are no more rows in `direction`
    pub position: Option<CatalogEntityId>,
    pub direction: SortDirection,
}

impl Cursor {
    pub fn forward(first_anchor: &str, last_anchor: &str, position: &str) -> Self {
        Self {
            first_anchor: first_anchor.to_string(),
            last_anchor: last_anchor.to_string(),
            position: Some(position.to_string()),
            direction: SortDirection::Asc,
        }
    }

    pub fn backward(first_anchor: &str, last_anchor: &str, position: &str) -> Self {
        Self {
            first_anchor: first_anchor.to_string(),
            last_anchor: last_anchor.to_string(),
            position: Some(position.to_string()),
            direction: SortDirection::Desc,
        }
    }

    pub fn encode(&self) -> String {
        let position = match &self.position {
            Some(id) => escape_id(id),
            None => ABSENT_POSITION.to_string(),
        };

        format!(
            "{}{ANCHOR_SEPARATOR}{}{ANCHOR_SEPARATOR}{position}{DIRECTION_SEPARATOR}{}",
            escape_id(&self.first_anchor),
            escape_id(&self.last_anchor),
            self.direction,
        )
    }

    pub fn decode(value: &str) -> Result<Self, InvalidCursorError> {
        let invalid = |reason: &str| InvalidCursorError {
            cursor: value.to_string(),
            reason: reason.to_string(),
        };

        if value.len() > MAX_CURSOR_LEN {
            return Err(invalid(&format!(
                "length {} exceeds the maximum of {MAX_CURSOR_LEN}",
                value.len()
            )));
        }

        let parts = value.split(ANCHOR_SEPARATOR).collect::<Vec<_>>();
        let [first_anchor, last_anchor, position_with_direction] = parts.as_slice() else {
            return Err(invalid("expected three ':'-separated segments"));
        };

        let Some((position, direction)) = position_with_direction.rsplit_once(DIRECTION_SEPARATOR)
        else {
            return Err(invalid("missing direction suffix"));
        };

        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid("unknown direction")),
        };

        let position = if position == ABSENT_POSITION {
            None
        } else {
            Some(unescape_id(position).ok_or_else(|| invalid("malformed position id"))?)
        };

        let first_anchor = unescape_id(first_anchor).ok_or_else(|| invalid("malformed anchor"))?;
        let last_anchor = unescape_id(last_anchor).ok_or_else(|| invalid("malformed anchor"))?;
        if first_anchor.is_empty() || last_anchor.is_empty() {
            return Err(invalid("empty anchor"));
        }

        Ok(Self {
            first_anchor,
            last_anchor,
            position,
            direction,
        })
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Cursor as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// Reserved sentinel: jump to the last page
    LastPage,
    At(Cursor),
}

impl PageCursor {
    pub fn parse(value: &str, last_page_sentinel: &str) -> Result<Self, InvalidCursorError> {
        if value == last_page_sentinel {
            Ok(Self::LastPage)
        } else {
            Cursor::decode(value).map(Self::At)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cursor '{cursor}': {reason}")]
pub struct InvalidCursorError {
    pub cursor: String,
    pub reason: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// Ids are percent-encoded, which covers the anchor separator. The direction
// separator is found from the right, so `_` inside ids stays as is.
fn escape_id(id: &str) -> String {
    if id == ABSENT_POSITION {
        return ESCAPED_ABSENT_POSITION_ID.to_string();
    }

    urlencoding::encode(id).into_owned()
}

fn unescape_id(escaped: &str) -> Option<String> {
    urlencoding::decode(escaped).ok().map(Cow::into_owned)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
