// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::cmp::Ordering;

use catalog_search::{FieldProjection, SearchFilterExpr, SearchFilterOp};
use serde_json::{Map, Value};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Evaluates a filter expression against a JSON document. A missing or null
/// field never matches a field condition.
pub(crate) fn matches(document: &Value, expr: &SearchFilterExpr) -> bool {
    match expr {
        SearchFilterExpr::MatchAll => true,
        SearchFilterExpr::Field { field, op } => match lookup(document, field) {
            None | Some(Value::Null) => false,
            Some(value) => op_matches(value, op),
        },
        SearchFilterExpr::ElemMatch { field, expr } => lookup(document, field)
            .and_then(Value::as_array)
            .is_some_and(|elements| elements.iter().any(|element| matches(element, expr))),
        SearchFilterExpr::And(clauses) => clauses.iter().all(|clause| matches(document, clause)),
        SearchFilterExpr::Or(clauses) => clauses.iter().any(|clause| matches(document, clause)),
        SearchFilterExpr::Not(expr) => !matches(document, expr),
    }
}

fn op_matches(value: &Value, op: &SearchFilterOp) -> bool {
    match op {
        SearchFilterOp::Eq(expected) => json_eq(value, expected),
        SearchFilterOp::Ne(expected) => !json_eq(value, expected),
        SearchFilterOp::Lt(bound) => compare(value, bound) == Some(Ordering::Less),
        SearchFilterOp::Lte(bound) => {
            matches!(compare(value, bound), Some(Ordering::Less | Ordering::Equal))
        }
        SearchFilterOp::Gt(bound) => compare(value, bound) == Some(Ordering::Greater),
        SearchFilterOp::Gte(bound) => {
            matches!(compare(value, bound), Some(Ordering::Greater | Ordering::Equal))
        }
        SearchFilterOp::In(candidates) => match value {
            Value::Array(elements) => elements
                .iter()
                .any(|element| candidates.iter().any(|c| json_eq(element, c))),
            _ => candidates.iter().any(|c| json_eq(value, c)),
        },
        SearchFilterOp::ContainsAll(required) => value.as_array().is_some_and(|elements| {
            required
                .iter()
                .all(|r| elements.iter().any(|element| json_eq(element, r)))
        }),
    }
}

/// Numbers compare numerically, strings lexicographically. Values of
/// different kinds are unordered.
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    compare(a, b) == Some(Ordering::Equal)
}

pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |value, segment| value.get(segment))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Keeps only the listed dotted paths, empty projection keeps everything
pub(crate) fn project(document: &Value, projection: &[FieldProjection]) -> Value {
    if projection.is_empty() {
        return document.clone();
    }

    let mut projected = Value::Object(Map::new());
    for path in projection {
        if let Some(value) = lookup(document, path) {
            insert_path(&mut projected, path, value.clone());
        }
    }
    projected
}

fn insert_path(target: &mut Value, path: &str, value: Value) {
    let segments = path.split('.').collect::<Vec<_>>();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        current = match current {
            Value::Object(object) => object
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if let Value::Object(object) = current {
        object.insert((*last).to_string(), value);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
