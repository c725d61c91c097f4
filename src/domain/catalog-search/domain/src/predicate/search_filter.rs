// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Dotted path of a document field, e.g. `availability` or `media.url`
pub type SearchFieldPath = String;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Boolean filter expression understood by the catalog store.
///
/// The executor never looks inside a rule group's predicate, it only wraps it
/// into conjunctions with availability and cursor range clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchFilterExpr {
    MatchAll,

    Field {
        field: SearchFieldPath,
        op: SearchFilterOp,
    },

    /// At least one element of the array `field` satisfies `expr`; field
    /// paths inside `expr` are relative to the element
    ElemMatch {
        field: SearchFieldPath,
        expr: Box<SearchFilterExpr>,
    },

    And(Vec<SearchFilterExpr>),

    Or(Vec<SearchFilterExpr>),

    Not(Box<SearchFilterExpr>),
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl SearchFilterExpr {
    pub fn and_clauses(clauses: Vec<SearchFilterExpr>) -> Self {
        assert!(!clauses.is_empty());
        if clauses.len() == 1 {
            clauses.into_iter().next().unwrap()
        } else {
            SearchFilterExpr::And(clauses)
        }
    }

    pub fn elem_match(field: impl Into<SearchFieldPath>, expr: SearchFilterExpr) -> Self {
        SearchFilterExpr::ElemMatch {
            field: field.into(),
            expr: Box::new(expr),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// AND: variable number of arguments
#[macro_export]
macro_rules! filter_and {
    // Zero arguments → explicit compile error
    () => {
        compile_error!("filter_and!() requires at least one argument")
    };

    // 1 arg -> just return the expr
    ($single:expr) => {
        $single
    };

    // 2+ args -> And(vec![...])
    ($first:expr, $($rest:expr),+ $(,)?) => {
        $crate::SearchFilterExpr::And(vec![$first, $($rest), +])
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// OR: variable number of arguments
#[macro_export]
macro_rules! filter_or {
    () => {
        compile_error!("filter_or!() requires at least one argument")
    };

    ($single:expr) => {
        $single
    };

    ($first:expr, $($rest:expr),+ $(,)?) => {
        $crate::SearchFilterExpr::Or(vec![$first, $($rest),+])
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[macro_export]
macro_rules! filter_not {
    ($expr:expr) => {
        $crate::SearchFilterExpr::Not(Box::new($expr))
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchFilterOp {
    Eq(serde_json::Value),
    Ne(serde_json::Value),
    Lt(serde_json::Value),
    Lte(serde_json::Value),
    Gt(serde_json::Value),
    Gte(serde_json::Value),
    /// Scalar value is one of the list, or array value intersects the list
    In(Vec<serde_json::Value>),
    /// Array value contains every element of the list
    ContainsAll(Vec<serde_json::Value>),
}

#[inline]
pub fn field_eq_str(field: impl Into<SearchFieldPath>, value: &str) -> SearchFilterExpr {
    SearchFilterExpr::Field {
        field: field.into(),
        op: SearchFilterOp::Eq(serde_json::json!(value)),
    }
}

#[inline]
pub fn field_gt_str(field: impl Into<SearchFieldPath>, value: &str) -> SearchFilterExpr {
    SearchFilterExpr::Field {
        field: field.into(),
        op: SearchFilterOp::Gt(serde_json::json!(value)),
    }
}

#[inline]
pub fn field_lt_str(field: impl Into<SearchFieldPath>, value: &str) -> SearchFilterExpr {
    SearchFilterExpr::Field {
        field: field.into(),
        op: SearchFilterOp::Lt(serde_json::json!(value)),
    }
}

#[inline]
pub fn field_lte_num(field: impl Into<SearchFieldPath>, value: i64) -> SearchFilterExpr {
    SearchFilterExpr::Field {
        field: field.into(),
        op: SearchFilterOp::Lte(serde_json::json!(value)),
    }
}

#[inline]
pub fn field_in_str<S>(
    field: impl Into<SearchFieldPath>,
    values: impl IntoIterator<Item = S>,
) -> SearchFilterExpr
where
    S: Into<String>,
{
    SearchFilterExpr::Field {
        field: field.into(),
        op: SearchFilterOp::In(
            values
                .into_iter()
                .map(|v| serde_json::Value::String(v.into()))
                .collect(),
        ),
    }
}

#[inline]
pub fn field_contains_all_str<S>(
    field: impl Into<SearchFieldPath>,
    values: impl IntoIterator<Item = S>,
) -> SearchFilterExpr
where
    S: Into<String>,
{
    SearchFilterExpr::Field {
        field: field.into(),
        op: SearchFilterOp::ContainsAll(
            values
                .into_iter()
                .map(|v| serde_json::Value::String(v.into()))
                .collect(),
        ),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
