// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Combines a rule group's base predicate with the availability and cursor
/// range clauses of a request. Pure: every call returns a new expression and
/// is meant to be applied at most once per predicate.
#[derive(Debug, Clone)]
pub struct PredicateComposer {
    id_field: String,
    availability_field: String,
}

impl PredicateComposer {
    pub fn new(id_field: impl Into<String>, availability_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            availability_field: availability_field.into(),
        }
    }

    pub fn from_config(config: &PaginatedSearchConfig) -> Self {
        Self::new(&config.id_field, &config.availability_field)
    }

    pub fn compose_with_availability(
        &self,
        predicate: SearchFilterExpr,
        availability_filter: Option<&AvailabilityFilter>,
    ) -> SearchFilterExpr {
        let Some(availability_filter) = availability_filter else {
            return predicate;
        };

        let conditions = availability_filter.conditions();
        if conditions.is_empty() {
            return predicate;
        }

        let mut clauses = Vec::with_capacity(conditions.len() + 1);
        clauses.push(predicate);
        clauses.extend(conditions.iter().map(|c| self.availability_clause(c)));

        SearchFilterExpr::and_clauses(clauses)
    }

    pub fn compose_with_cursor(
        &self,
        predicate: SearchFilterExpr,
        position: Option<&str>,
        direction: SortDirection,
    ) -> SearchFilterExpr {
        let Some(position) = position else {
            return predicate;
        };

        let range = match direction {
            SortDirection::Asc => field_gt_str(&self.id_field, position),
            SortDirection::Desc => field_lt_str(&self.id_field, position),
        };

        crate::filter_and!(predicate, range)
    }

    fn availability_clause(&self, condition: &AvailabilityCondition) -> SearchFilterExpr {
        let status = match &condition.status {
            StatusMatch::All(statuses) => field_contains_all_str("status", statuses.iter().cloned()),
            StatusMatch::In(statuses) => field_in_str("status", statuses.iter().cloned()),
        };

        SearchFilterExpr::elem_match(
            &self.availability_field,
            crate::filter_and!(field_eq_str("name", &condition.name), status),
        )
    }
}

impl Default for PredicateComposer {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD, DEFAULT_AVAILABILITY_FIELD)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
