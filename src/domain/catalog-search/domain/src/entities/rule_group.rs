// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::SearchFilterExpr;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Unique identifier of a catalog entity, also used as its sort key
pub type CatalogEntityId = String;

/// Dotted path of a requested output field, e.g. `name` or `media.url`
pub type FieldProjection = String;

pub const MEDIA_PROJECTION_WILDCARD: &str = "*";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One entity-type-scoped predicate plus its requested output fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub entity_type: String,

    pub predicate: Option<SearchFilterExpr>,

    /// Empty list means the whole document
    #[serde(default)]
    pub attributes: Vec<FieldProjection>,
}

impl RuleGroup {
    pub fn new(entity_type: impl Into<String>, predicate: SearchFilterExpr) -> Self {
        Self {
            entity_type: entity_type.into(),
            predicate: Some(predicate),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes<S>(mut self, attributes: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<FieldProjection>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Attributes the document store is able to serve, i.e. everything except
    /// the associated media paths
    pub fn store_attributes(&self, media_field: &str) -> Vec<FieldProjection> {
        self.attributes
            .iter()
            .filter(|attr| media_sub_field(attr, media_field).is_none())
            .cloned()
            .collect()
    }

    pub fn media_projection(&self, media_field: &str) -> MediaProjection {
        let mut fields = Vec::new();

        for attr in &self.attributes {
            match media_sub_field(attr, media_field) {
                None => {}
                Some(None | Some(MEDIA_PROJECTION_WILDCARD)) => return MediaProjection::All,
                Some(Some(field)) => {
                    if !fields.iter().any(|f| f == field) {
                        fields.push(field.to_string());
                    }
                }
            }
        }

        if fields.is_empty() {
            MediaProjection::None
        } else {
            MediaProjection::Fields(fields)
        }
    }
}

// `Some(None)` for the bare media field, `Some(Some(sub))` for `media.sub`
fn media_sub_field<'a>(attr: &'a str, media_field: &str) -> Option<Option<&'a str>> {
    let rest = attr.strip_prefix(media_field)?;
    if rest.is_empty() {
        Some(None)
    } else {
        rest.strip_prefix('.').map(Some)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Associated media requested by a rule group's projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaProjection {
    None,
    All,
    Fields(Vec<String>),
}

impl MediaProjection {
    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Narrows media record fields down to the requested ones
    pub fn select(
        &self,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> serde_json::Map<String, serde_json::Value> {
        match self {
            Self::None => serde_json::Map::new(),
            Self::All => fields.clone(),
            Self::Fields(names) => names
                .iter()
                .filter_map(|name| fields.get(name).map(|v| (name.clone(), v.clone())))
                .collect(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Rule group as received from the caller, before the rule parser reduced it
/// to a predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRuleGroup {
    pub entity_type: Option<String>,

    #[serde(default)]
    pub rules: serde_json::Value,

    #[serde(default)]
    pub attributes: Vec<FieldProjection>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
