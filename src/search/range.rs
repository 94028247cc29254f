// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Range clause builder.
//!
//! ```text
//! {"gte": 10, "lte": 100}   →  Range { field, bounds: [10, 100] }
//! {"gt": "2024-01-01"}      →  Range { field, bounds: (2024-01-01, ∞) }
//! {"foo": 1}                →  UnsupportedRangeOperator("foo")
//! ```

use serde_json::{Map, Value};

use super::query::{FieldValue, Query, RangeBounds};
use crate::error::QueryError;

/// Comparator keys accepted in a range map.
pub const RANGE_OPERATORS: [&str; 4] = ["gt", "gte", "lt", "lte"];

pub fn is_range_operator(key: &str) -> bool {
    RANGE_OPERATORS.contains(&key)
}

/// Compile a comparator map into one combined range clause for `field`.
///
/// Every present comparator contributes one bound to the same clause. An
/// empty map yields an unbounded range, which matches everything.
pub fn build_range(field: &str, conditions: &Map<String, Value>) -> Result<Query, QueryError> {
    let mut bounds = RangeBounds::new();

    for (operator, raw) in conditions {
        let slot = match operator.as_str() {
            "gt" => &mut bounds.gt,
            "gte" => &mut bounds.gte,
            "lt" => &mut bounds.lt,
            "lte" => &mut bounds.lte,
            _ => {
                return Err(QueryError::UnsupportedRangeOperator {
                    field: field.to_string(),
                    operator: operator.clone(),
                })
            }
        };
        let value = FieldValue::from_json(raw)
            .ok_or_else(|| QueryError::malformed(format!("{}.{}", field, operator), "scalar bound", raw))?;
        *slot = Some(value);
    }

    Ok(Query::range(field, bounds))
}
