// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Accepts rules already written as serialized [`SearchFilterExpr`] values.
/// Absent (`null`) rules select every entity of the group's type.
pub struct JsonRuleParser {}

#[dill::component(pub)]
#[dill::interface(dyn RuleParser)]
impl JsonRuleParser {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for JsonRuleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for JsonRuleParser {
    fn parse(&self, raw_groups: Vec<RawRuleGroup>) -> Result<Vec<RuleGroup>, RuleParseError> {
        raw_groups
            .into_iter()
            .enumerate()
            .map(|(group_index, raw)| -> Result<RuleGroup, RuleParseError> {
                let malformed = |reason: String| MalformedRuleError {
                    group_index,
                    reason,
                };

                let entity_type = match raw.entity_type {
                    Some(entity_type) if !entity_type.trim().is_empty() => entity_type,
                    _ => return Err(malformed("entity type is missing".to_string()).into()),
                };

                let predicate = match raw.rules {
                    serde_json::Value::Null => SearchFilterExpr::MatchAll,
                    rules => serde_json::from_value(rules)
                        .map_err(|e| malformed(e.to_string()))?,
                };

                Ok(RuleGroup {
                    entity_type,
                    predicate: Some(predicate),
                    attributes: raw.attributes,
                })
            })
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
