// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use catalog_search::*;
use internal_error::InternalError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
struct State {
    records_by_entity: HashMap<CatalogEntityId, Vec<MediaRecord>>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct InMemoryMediaLookup {
    state: Arc<RwLock<State>>,
}

#[dill::component(pub)]
#[dill::interface(dyn MediaLookup)]
#[dill::scope(dill::Singleton)]
impl InMemoryMediaLookup {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    pub fn add(&self, record: MediaRecord) {
        let mut state = self.state.write().unwrap();
        state
            .records_by_entity
            .entry(record.entity_id.clone())
            .or_default()
            .push(record);
    }
}

impl Default for InMemoryMediaLookup {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl MediaLookup for InMemoryMediaLookup {
    #[tracing::instrument(level = "debug", skip_all, fields(num_entities = entity_ids.len()))]
    async fn find_by_entity_ids(
        &self,
        entity_ids: &[CatalogEntityId],
    ) -> Result<Vec<MediaRecord>, InternalError> {
        let state = self.state.read().unwrap();

        Ok(entity_ids
            .iter()
            .filter_map(|entity_id| state.records_by_entity.get(entity_id))
            .flatten()
            .cloned()
            .collect())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
