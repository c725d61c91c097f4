// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::CatalogEntityId;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Source of media (images, documents) associated with catalog entities
#[cfg_attr(any(feature = "testing", test), mockall::automock)]
#[async_trait::async_trait]
pub trait MediaLookup: Send + Sync {
    async fn find_by_entity_ids(
        &self,
        entity_ids: &[CatalogEntityId],
    ) -> Result<Vec<MediaRecord>, InternalError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub entity_id: CatalogEntityId,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl MediaRecord {
    /// Builds a record from a JSON object, anything else yields no fields
    pub fn new(entity_id: impl Into<CatalogEntityId>, fields: serde_json::Value) -> Self {
        let fields = match fields {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Self {
            entity_id: entity_id.into(),
            fields,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
