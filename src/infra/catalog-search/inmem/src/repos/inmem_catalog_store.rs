// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use catalog_search::*;
use internal_error::{InternalError, ResultIntoInternal};
use tokio::sync::RwLock;

use crate::filter_eval;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const PRICES_FIELD: &str = "prices";

#[derive(Default)]
struct State {
    documents_by_type: HashMap<String, BTreeMap<CatalogEntityId, serde_json::Value>>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Keeps catalog documents in memory and evaluates filter expressions over
/// them. Documents are keyed by their string `id`.
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<State>>,
}

#[dill::component(pub)]
#[dill::interface(dyn CatalogStore)]
#[dill::scope(dill::Singleton)]
impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Inserts or replaces a document
    pub async fn upsert(
        &self,
        entity_type: &str,
        document: serde_json::Value,
    ) -> Result<(), InternalError> {
        let Some(id) = document
            .get(DEFAULT_ID_FIELD)
            .and_then(serde_json::Value::as_str)
        else {
            return InternalError::bail(format!(
                "Document of type '{entity_type}' has no string '{DEFAULT_ID_FIELD}'"
            ));
        };
        let id = id.to_string();

        let mut writable_state = self.state.write().await;
        writable_state
            .documents_by_type
            .entry(entity_type.to_string())
            .or_default()
            .insert(id, document);

        Ok(())
    }

    pub async fn upsert_many(
        &self,
        entity_type: &str,
        documents: impl IntoIterator<Item = serde_json::Value>,
    ) -> Result<(), InternalError> {
        for document in documents {
            self.upsert(entity_type, document).await?;
        }
        Ok(())
    }

    /// Returns whether the document existed
    pub async fn remove(&self, entity_type: &str, id: &str) -> bool {
        let mut writable_state = self.state.write().await;
        writable_state
            .documents_by_type
            .get_mut(entity_type)
            .is_some_and(|documents| documents.remove(id).is_some())
    }

    async fn matching_documents(
        &self,
        entity_type: &str,
        predicate: &SearchFilterExpr,
    ) -> Vec<serde_json::Value> {
        let readable_state = self.state.read().await;

        readable_state
            .documents_by_type
            .get(entity_type)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| filter_eval::matches(document, predicate))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            entity_type = %request.entity_type,
            sort = %request.sort.direction,
            offset = request.offset,
            limit = request.limit,
        )
    )]
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<serde_json::Value>, InternalError> {
        let mut documents = self
            .matching_documents(&request.entity_type, &request.predicate)
            .await;

        let sort_field = request.sort.field.as_str();
        documents.sort_by(|a, b| {
            let ordering = compare_optional(
                filter_eval::lookup(a, sort_field),
                filter_eval::lookup(b, sort_field),
            );
            match request.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Ok(documents
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|document| filter_eval::project(document, &request.projection))
            .collect())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(%entity_type))]
    async fn count(
        &self,
        entity_type: &str,
        predicate: &SearchFilterExpr,
    ) -> Result<u64, InternalError> {
        let documents = self.matching_documents(entity_type, predicate).await;

        u64::try_from(documents.len()).int_err()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(%entity_type))]
    async fn aggregate_prices(
        &self,
        entity_type: &str,
        predicate: &SearchFilterExpr,
    ) -> Result<Vec<AggregatedPrice>, InternalError> {
        let documents = self.matching_documents(entity_type, predicate).await;

        let mut sums: BTreeMap<(String, String), (f64, u64)> = BTreeMap::new();

        for document in &documents {
            let Some(prices) = document
                .get(PRICES_FIELD)
                .and_then(serde_json::Value::as_array)
            else {
                continue;
            };

            let mut contributed = BTreeSet::new();
            for price in prices {
                let (Some(currency), Some(price_type_code), Some(amount)) = (
                    price.get("currency").and_then(serde_json::Value::as_str),
                    price.get("priceTypeCode").and_then(serde_json::Value::as_str),
                    price.get("price").and_then(serde_json::Value::as_f64),
                ) else {
                    tracing::warn!(?price, "Skipping malformed price entry");
                    continue;
                };

                let key = (currency.to_string(), price_type_code.to_string());
                let entry = sums.entry(key.clone()).or_insert((0.0, 0));
                entry.0 += amount;
                if contributed.insert(key) {
                    entry.1 += 1;
                }
            }
        }

        Ok(sums
            .into_iter()
            .map(
                |((currency, price_type_code), (price, products_count))| AggregatedPrice {
                    currency,
                    price_type_code,
                    price,
                    products_count,
                },
            )
            .collect())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// Documents lacking the sort field go first, unordered values keep their order
fn compare_optional(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => filter_eval::compare(a, b).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
