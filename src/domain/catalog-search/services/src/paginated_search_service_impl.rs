// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::Arc;

use catalog_search::*;
use internal_error::{InternalError, ResultIntoInternal};

use crate::{PageCursors, merge_aggregated_prices};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct PaginatedSearchServiceImpl {
    catalog_store: Arc<dyn CatalogStore>,
    media_lookup: Arc<dyn MediaLookup>,
    config: Arc<PaginatedSearchConfig>,
    composer: PredicateComposer,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
enum PageMode {
    /// No offset and no cursor
    FirstRequest,
    Offset(usize),
    LastPage,
    Cursor(Cursor),
}

/// Rule group after validation and availability composition
struct PreparedGroup {
    entity_type: String,
    predicate: SearchFilterExpr,
    projection: Vec<FieldProjection>,
    keep_availability: bool,
    media: MediaProjection,
}

struct FetchPlan {
    predicate: SearchFilterExpr,
    direction: SortDirection,
    offset: usize,
    limit: usize,
    probe_first: bool,
    probe_last: bool,
}

#[derive(Default)]
struct GroupOutcome {
    rows: Vec<serde_json::Value>,
    cursors: PageCursors,
    count: Option<u64>,
    prices: Option<Vec<AggregatedPrice>>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component(pub)]
#[dill::interface(dyn PaginatedSearchService)]
impl PaginatedSearchServiceImpl {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        media_lookup: Arc<dyn MediaLookup>,
        config: Arc<PaginatedSearchConfig>,
    ) -> Self {
        let composer = PredicateComposer::from_config(&config);

        Self {
            catalog_store,
            media_lookup,
            config,
            composer,
        }
    }

    fn prepare_groups(
        &self,
        rule_groups: Vec<RuleGroup>,
        availability_filter: Option<&AvailabilityFilter>,
    ) -> Result<Vec<PreparedGroup>, SearchExecuteError> {
        if rule_groups.is_empty() {
            return Err(reject("at least one rule group is required"));
        }

        rule_groups
            .into_iter()
            .enumerate()
            .map(|(index, group)| {
                if group.entity_type.trim().is_empty() {
                    return Err(reject(format!("rule group #{index} has no entity type")));
                }

                let Some(predicate) = &group.predicate else {
                    return Err(reject(format!("rule group #{index} has no predicate")));
                };

                Ok(PreparedGroup {
                    predicate: self
                        .composer
                        .compose_with_availability(predicate.clone(), availability_filter),
                    projection: self.store_projection(&group),
                    keep_availability: group
                        .attributes
                        .iter()
                        .any(|attr| *attr == self.config.availability_field),
                    media: group.media_projection(&self.config.media_field),
                    entity_type: group.entity_type,
                })
            })
            .collect()
    }

    fn store_projection(&self, group: &RuleGroup) -> Vec<FieldProjection> {
        if group.attributes.is_empty() {
            return Vec::new();
        }

        let mut projection = vec![
            self.config.id_field.clone(),
            self.config.availability_field.clone(),
        ];
        for attr in group.store_attributes(&self.config.media_field) {
            if !projection.contains(&attr) {
                projection.push(attr);
            }
        }
        projection
    }

    fn resolve_page_mode(
        &self,
        page: &PageParams,
        num_groups: usize,
    ) -> Result<PageMode, SearchExecuteError> {
        if page.limit == 0 {
            return Err(reject("limit must be positive"));
        }
        if page.limit > self.config.max_page_size {
            return Err(reject(format!(
                "limit {} exceeds the maximum page size {}",
                page.limit, self.config.max_page_size
            )));
        }

        let offset = page.effective_offset();

        match &page.cursor {
            None if offset == 0 => Ok(PageMode::FirstRequest),
            None => Ok(PageMode::Offset(offset)),
            Some(_) if offset > 0 => Err(reject("offset and cursor are mutually exclusive")),
            Some(cursor) => match PageCursor::parse(cursor, &self.config.last_page_sentinel) {
                Ok(PageCursor::LastPage) => Ok(PageMode::LastPage),
                Ok(PageCursor::At(_)) if num_groups > 1 => Err(reject(
                    "a cursor can only continue a search over a single rule group",
                )),
                Ok(PageCursor::At(cursor)) => Ok(PageMode::Cursor(cursor)),
                Err(e) => Err(reject(e.to_string())),
            },
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(entity_type = %group.entity_type))]
    async fn execute_group(
        &self,
        group: &PreparedGroup,
        mode: &PageMode,
        limit: usize,
        options: &SearchOptions,
    ) -> Result<GroupOutcome, InternalError> {
        if let PageMode::Cursor(Cursor { position: None, .. }) = mode {
            tracing::debug!("Cursor has no position, nothing left in its direction");

            let (count, prices) = tokio::try_join!(
                self.count_if(group, options.want_counts),
                self.aggregate_prices_if(group, options.want_prices),
            )?;

            return Ok(GroupOutcome {
                count,
                prices,
                ..Default::default()
            });
        }

        let mut known_total = None;

        let plan = match mode {
            PageMode::FirstRequest => FetchPlan {
                predicate: group.predicate.clone(),
                direction: SortDirection::Asc,
                offset: 0,
                limit,
                probe_first: false,
                probe_last: true,
            },
            PageMode::Offset(offset) => FetchPlan {
                predicate: group.predicate.clone(),
                direction: SortDirection::Asc,
                offset: *offset,
                limit,
                probe_first: true,
                probe_last: true,
            },
            PageMode::LastPage => {
                // Size of the last page depends on the total
                let total = self
                    .catalog_store
                    .count(&group.entity_type, &group.predicate)
                    .await?;

                if total == 0 {
                    tracing::debug!("Nothing matches, last page is empty");
                    return Ok(GroupOutcome {
                        count: options.want_counts.then_some(0),
                        prices: options.want_prices.then(Vec::new),
                        ..Default::default()
                    });
                }
                known_total = Some(total);

                let remainder = usize::try_from(total % u64::try_from(limit).int_err()?).int_err()?;

                FetchPlan {
                    predicate: group.predicate.clone(),
                    direction: SortDirection::Desc,
                    offset: 0,
                    limit: if remainder == 0 { limit } else { remainder },
                    probe_first: true,
                    probe_last: false,
                }
            }
            PageMode::Cursor(cursor) => FetchPlan {
                predicate: self.composer.compose_with_cursor(
                    group.predicate.clone(),
                    cursor.position.as_deref(),
                    cursor.direction,
                ),
                direction: cursor.direction,
                offset: 0,
                limit,
                probe_first: false,
                probe_last: false,
            },
        };

        tracing::debug!(
            ?mode,
            direction = %plan.direction,
            offset = plan.offset,
            limit = plan.limit,
            probe_first = plan.probe_first,
            probe_last = plan.probe_last,
            "Planned group fetch"
        );

        let fetch_request = FetchRequest {
            entity_type: group.entity_type.clone(),
            predicate: plan.predicate,
            projection: group.projection.clone(),
            sort: SortSpec::new(&self.config.id_field, plan.direction),
            offset: plan.offset,
            limit: plan.limit,
        };

        let (mut rows, probed_first, probed_last, count, prices) = tokio::try_join!(
            self.catalog_store.fetch(&fetch_request),
            self.probe_anchor(group, SortDirection::Asc, plan.probe_first),
            self.probe_anchor(group, SortDirection::Desc, plan.probe_last),
            self.count_if(group, options.want_counts && known_total.is_none()),
            self.aggregate_prices_if(group, options.want_prices),
        )?;

        // Caller-facing order is always ascending
        if plan.direction == SortDirection::Desc {
            rows.reverse();
        }

        let first_row_id = rows.first().map(|row| self.entity_id(row)).transpose()?;
        let last_row_id = rows.last().map(|row| self.entity_id(row)).transpose()?;

        let (first_anchor, last_anchor) = match mode {
            PageMode::FirstRequest => (first_row_id.clone(), probed_last),
            PageMode::Offset(_) => (probed_first, probed_last),
            PageMode::LastPage => (probed_first, last_row_id.clone()),
            PageMode::Cursor(cursor) => (
                Some(cursor.first_anchor.clone()),
                Some(cursor.last_anchor.clone()),
            ),
        };

        let cursors = PageCursors::compute(
            first_row_id.as_deref().zip(last_row_id.as_deref()),
            first_anchor.as_deref(),
            last_anchor.as_deref(),
            matches!(mode, PageMode::FirstRequest),
        );

        tracing::debug!(
            num_rows = rows.len(),
            ?first_anchor,
            ?last_anchor,
            has_next = cursors.next.is_some(),
            has_prev = cursors.prev.is_some(),
            "Group page fetched"
        );

        Ok(GroupOutcome {
            rows,
            cursors,
            count: match known_total {
                Some(total) if options.want_counts => Some(total),
                _ => count,
            },
            prices,
        })
    }

    /// Learns the id at one end of the group's natural order
    async fn probe_anchor(
        &self,
        group: &PreparedGroup,
        direction: SortDirection,
        enabled: bool,
    ) -> Result<Option<CatalogEntityId>, InternalError> {
        if !enabled {
            return Ok(None);
        }

        let rows = self
            .catalog_store
            .fetch(&FetchRequest {
                entity_type: group.entity_type.clone(),
                predicate: group.predicate.clone(),
                projection: vec![self.config.id_field.clone()],
                sort: SortSpec::new(&self.config.id_field, direction),
                offset: 0,
                limit: 1,
            })
            .await?;

        rows.first().map(|row| self.entity_id(row)).transpose()
    }

    async fn count_if(
        &self,
        group: &PreparedGroup,
        enabled: bool,
    ) -> Result<Option<u64>, InternalError> {
        if !enabled {
            return Ok(None);
        }

        self.catalog_store
            .count(&group.entity_type, &group.predicate)
            .await
            .map(Some)
    }

    async fn aggregate_prices_if(
        &self,
        group: &PreparedGroup,
        enabled: bool,
    ) -> Result<Option<Vec<AggregatedPrice>>, InternalError> {
        if !enabled {
            return Ok(None);
        }

        self.catalog_store
            .aggregate_prices(&group.entity_type, &group.predicate)
            .await
            .map(Some)
    }

    /// Attaches associated media to the rows of groups that requested it, using
    /// a single batched lookup
    async fn attach_media(
        &self,
        groups: &[PreparedGroup],
        outcomes: &mut [GroupOutcome],
    ) -> Result<(), InternalError> {
        let mut entity_ids = Vec::new();
        for (group, outcome) in groups.iter().zip(outcomes.iter()) {
            if group.media.is_requested() {
                for row in &outcome.rows {
                    entity_ids.push(self.entity_id(row)?);
                }
            }
        }

        if entity_ids.is_empty() {
            return Ok(());
        }

        entity_ids.sort();
        entity_ids.dedup();

        tracing::debug!(num_entities = entity_ids.len(), "Looking up associated media");

        let records = self.media_lookup.find_by_entity_ids(&entity_ids).await?;

        let mut records_by_entity: HashMap<&str, Vec<&MediaRecord>> = HashMap::new();
        for record in &records {
            records_by_entity
                .entry(record.entity_id.as_str())
                .or_default()
                .push(record);
        }

        for (group, outcome) in groups.iter().zip(outcomes.iter_mut()) {
            if !group.media.is_requested() {
                continue;
            }

            for row in &mut outcome.rows {
                let entity_id = self.entity_id(row)?;

                let media: Vec<serde_json::Value> = records_by_entity
                    .get(entity_id.as_str())
                    .map(|records| {
                        records
                            .iter()
                            .map(|record| serde_json::Value::Object(group.media.select(&record.fields)))
                            .collect()
                    })
                    .unwrap_or_default();

                if let Some(entity) = row.as_object_mut() {
                    entity.insert(
                        self.config.media_field.clone(),
                        serde_json::Value::Array(media),
                    );
                }
            }
        }

        Ok(())
    }

    fn assemble(
        &self,
        groups: Vec<PreparedGroup>,
        outcomes: Vec<GroupOutcome>,
        options: &SearchOptions,
    ) -> Result<SearchResult, InternalError> {
        let counts = options.want_counts.then(|| {
            let mut counts = groups
                .iter()
                .zip(outcomes.iter())
                .map(|(group, outcome)| {
                    EntityCount::new(&group.entity_type, outcome.count.unwrap_or_default())
                })
                .collect::<Vec<_>>();

            let total: u64 = counts.iter().map(|c| c.count).sum();
            counts.push(EntityCount::new(&self.config.total_count_label, total));
            counts
        });

        let prices = options.want_prices.then(|| {
            merge_aggregated_prices(
                outcomes
                    .iter()
                    .flat_map(|outcome| outcome.prices.iter().flatten().cloned()),
                self.config.price_precision,
            )
        });

        let mut group_pages = Vec::with_capacity(groups.len());
        for (group, outcome) in groups.into_iter().zip(outcomes) {
            let items = outcome
                .rows
                .into_iter()
                .map(|row| self.make_search_item(&group, row))
                .collect::<Result<Vec<_>, _>>()?;

            group_pages.push(GroupPage {
                entity_type: group.entity_type,
                items,
                is_first_page: outcome.cursors.is_first_page(),
                is_last_page: outcome.cursors.is_last_page(),
                next_cursor: outcome.cursors.next.as_ref().map(Cursor::encode),
                prev_cursor: outcome.cursors.prev.as_ref().map(Cursor::encode),
            });
        }

        let (next_cursor, prev_cursor) = match group_pages.as_slice() {
            [single] => (single.next_cursor.clone(), single.prev_cursor.clone()),
            _ => (None, None),
        };

        Ok(SearchResult {
            items: group_pages
                .iter()
                .flat_map(|page| page.items.iter().cloned())
                .collect(),
            counts,
            prices,
            next_cursor,
            prev_cursor,
            is_first_page: group_pages.iter().all(|page| page.is_first_page),
            is_last_page: group_pages.iter().all(|page| page.is_last_page),
            groups: group_pages,
        })
    }

    fn make_search_item(
        &self,
        group: &PreparedGroup,
        mut row: serde_json::Value,
    ) -> Result<SearchItem, InternalError> {
        let field = self.config.availability_field.as_str();

        let availability = match row.as_object_mut() {
            Some(entity) if group.keep_availability => entity.get(field).cloned(),
            Some(entity) => entity.remove(field),
            None => None,
        };

        let availability = match availability {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value)
                .context_int_err(format!("malformed {field} of a '{}' entity", group.entity_type))?,
        };

        Ok(SearchItem {
            entity_type: group.entity_type.clone(),
            entity: row,
            availability,
        })
    }

    fn entity_id(&self, row: &serde_json::Value) -> Result<CatalogEntityId, InternalError> {
        match row.get(&self.config.id_field) {
            Some(serde_json::Value::String(id)) => Ok(id.clone()),
            _ => InternalError::bail(format!(
                "Store returned a document without a string '{}'",
                self.config.id_field
            )),
        }
    }
}

fn reject(reason: impl Into<String>) -> SearchExecuteError {
    let reason = reason.into();
    tracing::warn!(%reason, "Rejected search query");
    SearchExecuteError::invalid_query(reason)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl PaginatedSearchService for PaginatedSearchServiceImpl {
    #[tracing::instrument(
        level = "debug",
        name = "PaginatedSearchServiceImpl_execute",
        skip_all,
        fields(num_groups = rule_groups.len(), ?page)
    )]
    async fn execute(
        &self,
        rule_groups: Vec<RuleGroup>,
        page: PageParams,
        options: SearchOptions,
    ) -> Result<SearchResult, SearchExecuteError> {
        let groups = self.prepare_groups(rule_groups, options.availability_filter.as_ref())?;
        let mode = self.resolve_page_mode(&page, groups.len())?;

        let mut outcomes = futures::future::try_join_all(
            groups
                .iter()
                .map(|group| self.execute_group(group, &mode, page.limit, &options)),
        )
        .await?;

        self.attach_media(&groups, &mut outcomes).await?;

        self.assemble(groups, outcomes, &options)
            .map_err(Into::into)
    }

    #[tracing::instrument(
        level = "debug",
        name = "PaginatedSearchServiceImpl_count_matches",
        skip_all,
        fields(num_groups = rule_groups.len())
    )]
    async fn count_matches(
        &self,
        rule_groups: Vec<RuleGroup>,
        availability_filter: Option<AvailabilityFilter>,
    ) -> Result<Vec<EntityCount>, SearchExecuteError> {
        let groups = self.prepare_groups(rule_groups, availability_filter.as_ref())?;

        let per_group = futures::future::try_join_all(groups.iter().map(|group| {
            self.catalog_store
                .count(&group.entity_type, &group.predicate)
        }))
        .await?;

        let mut counts = groups
            .iter()
            .zip(per_group)
            .map(|(group, count)| EntityCount::new(&group.entity_type, count))
            .collect::<Vec<_>>();

        let total: u64 = counts.iter().map(|c| c.count).sum();
        counts.push(EntityCount::new(&self.config.total_count_label, total));

        if total == 0 {
            tracing::debug!("Nothing matches the counted rule groups");
            return Err(NoMatchesError { counts }.into());
        }

        Ok(counts)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
