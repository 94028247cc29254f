// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter compiler
//!
//! Compiles the caller's loosely-typed filter map into a [`Query`] tree in one
//! recursive pass. Every top-level entry lands in a single root `Bool`.
//!
//! # Filter shapes
//!
//! ```text
//! "status": "active"                       → must:     term(status = active)
//! "tags": ["rust", "db"]                   → must:     terms(tags ∈ {rust, db})
//! "price": {"gte": 10, "lte": 100}         → must:     range(price ∈ [10, 100])
//! "flags": {"pinned": true}                → must:     term(flags.pinned = true)
//! "status": {"must_not": ["draft"]}        → must_not: terms(status ∈ {draft})
//! "must_not": ["draft", "deleted"]         → must_not: terms(<exclusion_field> ∈ {...})
//! "must_not": {"type": "spam"}             → must_not: terms(type ∈ {spam})
//! "bool": {"should": [{"match": {...}}]}   → parts merged into the root slots
//! ```
//!
//! Any malformed entry fails the whole compile; no partial query is returned.

use serde_json::{Map, Value};

use super::query::{BoolQuery, FieldValue, Query};
use super::range::{build_range, is_range_operator};
use crate::config::CompilerConfig;
use crate::criteria::{FilterMap, SearchCriteria};
use crate::error::QueryError;

const MUST_NOT: &str = "must_not";
const BOOL: &str = "bool";

/// Filter map → query compiler
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile a full criteria: filters plus the optional free-text clause.
    pub fn compile_criteria(
        criteria: &SearchCriteria,
        config: &CompilerConfig,
    ) -> Result<Query, QueryError> {
        let mut root = Self::compile_filters(&criteria.filter_criteria_map, config)?;
        if let Some(text) = criteria.free_text() {
            root.must.push(Self::free_text_clause(text, config));
        }
        Ok(Query::Bool(root))
    }

    /// Compile a filter map. `None` and `{}` both yield the match-all query.
    pub fn compile(filters: Option<&FilterMap>, config: &CompilerConfig) -> Result<Query, QueryError> {
        match filters {
            Some(filters) => Self::compile_filters(filters, config).map(Query::Bool),
            None => Ok(Query::match_all()),
        }
    }

    fn compile_filters(filters: &FilterMap, config: &CompilerConfig) -> Result<BoolQuery, QueryError> {
        let mut root = BoolQuery::new();
        for (key, value) in filters {
            match key.as_str() {
                MUST_NOT => Self::compile_exclusions(value, config, &mut root)?,
                BOOL => root.merge(Self::compile_bool(value)?),
                _ => Self::compile_field(key, value, &mut root)?,
            }
        }
        Ok(root)
    }

    fn compile_field(field: &str, value: &Value, root: &mut BoolQuery) -> Result<(), QueryError> {
        match value {
            Value::Array(items) => {
                root.must.push(Query::Terms {
                    field: field.to_string(),
                    values: Self::scalars(field, items)?,
                });
            }
            Value::Object(nested) => Self::compile_nested(field, nested, root)?,
            scalar => {
                let value = FieldValue::from_json(scalar)
                    .ok_or_else(|| QueryError::malformed(field, "scalar, array or object", scalar))?;
                root.must.push(Query::Term { field: field.to_string(), value });
            }
        }
        Ok(())
    }

    fn compile_nested(
        field: &str,
        nested: &Map<String, Value>,
        root: &mut BoolQuery,
    ) -> Result<(), QueryError> {
        if nested.is_empty() || nested.keys().any(|k| is_range_operator(k)) {
            root.must.push(build_range(field, nested)?);
            return Ok(());
        }

        if let Some(excluded) = nested.get(MUST_NOT) {
            if nested.len() > 1 {
                return Err(QueryError::malformed(
                    field,
                    "a lone must_not entry",
                    &Value::Object(nested.clone()),
                ));
            }
            root.must_not.push(Self::exclusion(field, excluded)?);
            return Ok(());
        }

        // One level of boolean leaves only; deeper nesting is a caller error.
        for (key, leaf) in nested {
            match leaf {
                Value::Bool(b) => root.must.push(Query::term(format!("{}.{}", field, key), *b)),
                Value::Number(_) => {
                    return Err(QueryError::UnsupportedRangeOperator {
                        field: field.to_string(),
                        operator: key.clone(),
                    })
                }
                other => {
                    return Err(QueryError::malformed(
                        format!("{}.{}", field, key),
                        "boolean nested leaf",
                        other,
                    ))
                }
            }
        }
        Ok(())
    }

    fn compile_exclusions(
        value: &Value,
        config: &CompilerConfig,
        root: &mut BoolQuery,
    ) -> Result<(), QueryError> {
        match value {
            Value::Object(per_field) => {
                for (field, excluded) in per_field {
                    root.must_not.push(Self::exclusion(field, excluded)?);
                }
            }
            other => root.must_not.push(Self::exclusion(&config.exclusion_field, other)?),
        }
        Ok(())
    }

    /// Terms exclusion; a scalar becomes a singleton set.
    fn exclusion(field: &str, value: &Value) -> Result<Query, QueryError> {
        let values = match value {
            Value::Array(items) => Self::scalars(field, items)?,
            other => vec![FieldValue::from_json(other)
                .ok_or_else(|| QueryError::malformed(field, "scalar or array", other))?],
        };
        Ok(Query::Terms { field: field.to_string(), values })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Explicit boolean composition
    // ═══════════════════════════════════════════════════════════════════════

    fn compile_bool(value: &Value) -> Result<BoolQuery, QueryError> {
        let slots = value
            .as_object()
            .ok_or_else(|| QueryError::malformed(BOOL, "object of clause lists", value))?;

        let mut out = BoolQuery::new();
        for (slot, parts) in slots {
            let target = match slot.as_str() {
                "must" => &mut out.must,
                "filter" => &mut out.filter,
                "should" => &mut out.should,
                MUST_NOT => &mut out.must_not,
                other => return Err(QueryError::UnsupportedQueryType(format!("bool.{}", other))),
            };
            match parts {
                Value::Array(parts) => {
                    for part in parts {
                        target.push(Self::compile_part(part)?);
                    }
                }
                Value::Object(_) => target.push(Self::compile_part(parts)?),
                other => {
                    return Err(QueryError::malformed(
                        format!("bool.{}", slot),
                        "array of query parts",
                        other,
                    ))
                }
            }
        }
        Ok(out)
    }

    /// One query part: `{"term"|"terms"|"match"|"range"|"bool": {...}}`.
    fn compile_part(part: &Value) -> Result<Query, QueryError> {
        let kinds = part
            .as_object()
            .ok_or_else(|| QueryError::malformed("query part", "object", part))?;

        let mut queries = Vec::new();
        for (kind, body) in kinds {
            if kind == BOOL {
                queries.push(Query::Bool(Self::compile_bool(body)?));
                continue;
            }
            let leaf: fn(&str, &Value) -> Result<Query, QueryError> = match kind.as_str() {
                "term" => Self::term_part,
                "terms" => Self::terms_part,
                "match" => Self::match_part,
                "range" => Self::range_part,
                other => return Err(QueryError::UnsupportedQueryType(other.to_string())),
            };
            let fields = body
                .as_object()
                .ok_or_else(|| QueryError::malformed(kind.as_str(), "object keyed by field", body))?;
            for (field, raw) in fields {
                queries.push(leaf(field, raw)?);
            }
        }

        Ok(match queries.len() {
            0 => return Err(QueryError::malformed("query part", "at least one clause", part)),
            1 => queries.remove(0),
            _ => Query::Bool(BoolQuery { must: queries, ..Default::default() }),
        })
    }

    fn term_part(field: &str, raw: &Value) -> Result<Query, QueryError> {
        Ok(Query::Term { field: field.to_string(), value: Self::scalar(field, raw)? })
    }

    fn match_part(field: &str, raw: &Value) -> Result<Query, QueryError> {
        Ok(Query::Match { field: field.to_string(), value: Self::scalar(field, raw)? })
    }

    fn terms_part(field: &str, raw: &Value) -> Result<Query, QueryError> {
        let items = raw
            .as_array()
            .ok_or_else(|| QueryError::malformed(field, "array", raw))?;
        Ok(Query::Terms { field: field.to_string(), values: Self::scalars(field, items)? })
    }

    fn range_part(field: &str, raw: &Value) -> Result<Query, QueryError> {
        let conditions = raw
            .as_object()
            .ok_or_else(|| QueryError::malformed(field, "range conditions", raw))?;
        build_range(field, conditions)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════

    fn free_text_clause(text: &str, config: &CompilerConfig) -> Query {
        let mut clauses: Vec<Query> = config
            .free_text_fields
            .iter()
            .map(|field| Query::match_text(field.as_str(), text))
            .collect();
        match clauses.len() {
            0 => Query::match_text("*", text),
            1 => clauses.remove(0),
            _ => Query::Bool(BoolQuery { should: clauses, ..Default::default() }),
        }
    }

    fn scalar(field: &str, value: &Value) -> Result<FieldValue, QueryError> {
        FieldValue::from_json(value).ok_or_else(|| QueryError::malformed(field, "scalar", value))
    }

    fn scalars(field: &str, items: &[Value]) -> Result<Vec<FieldValue>, QueryError> {
        items.iter().map(|item| Self::scalar(field, item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query::RangeBounds;
    use serde_json::json;

    fn filters(value: Value) -> FilterMap {
        value.as_object().cloned().unwrap()
    }

    fn compile(value: Value) -> Result<BoolQuery, QueryError> {
        match QueryCompiler::compile(Some(&filters(value)), &CompilerConfig::default())? {
            Query::Bool(b) => Ok(b),
            other => panic!("Expected Bool root, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_absent_match_all() {
        let config = CompilerConfig::default();
        assert!(QueryCompiler::compile(None, &config).unwrap().is_match_all());
        assert!(QueryCompiler::compile(Some(&FilterMap::new()), &config).unwrap().is_match_all());
    }

    #[test]
    fn test_scalars_become_terms() {
        let root = compile(json!({"field1": true, "field2": "stringValue", "field3": 7})).unwrap();
        assert_eq!(
            root.must,
            vec![
                Query::term("field1", true),
                Query::term("field2", "stringValue"),
                Query::term("field3", 7),
            ]
        );
        assert!(root.must_not.is_empty());
    }

    #[test]
    fn test_array_becomes_terms() {
        let root = compile(json!({"field1": ["value1", "value2"]})).unwrap();
        assert_eq!(root.must, vec![Query::terms("field1", ["value1", "value2"])]);
    }

    #[test]
    fn test_array_with_object_is_malformed() {
        let err = compile(json!({"field1": ["ok", {"no": 1}]})).unwrap_err();
        assert!(matches!(err, QueryError::MalformedFilterShape { .. }));
    }

    #[test]
    fn test_range_map_single_clause() {
        let root = compile(json!({"field1": {"gte": 10, "lte": 100}})).unwrap();
        assert_eq!(
            root.must,
            vec![Query::range("field1", RangeBounds::new().gte(10).lte(100))]
        );
    }

    #[test]
    fn test_unknown_numeric_key_is_range_error() {
        let err = compile(json!({"field1": {"foo": 1}})).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedRangeOperator { field: "field1".into(), operator: "foo".into() }
        );
    }

    #[test]
    fn test_range_error_discards_other_clauses() {
        let result = compile(json!({"ok": "fine", "age": {"gte": 1, "within": 3}}));
        assert!(matches!(result, Err(QueryError::UnsupportedRangeOperator { .. })));
    }

    #[test]
    fn test_top_level_must_not_array() {
        let root = compile(json!({"must_not": ["value1", "value2"]})).unwrap();
        assert!(root.must.is_empty());
        assert_eq!(root.must_not, vec![Query::terms("status", ["value1", "value2"])]);
    }

    #[test]
    fn test_top_level_must_not_scalar_is_singleton() {
        let root = compile(json!({"must_not": "notAnArrayList"})).unwrap();
        assert_eq!(root.must_not, vec![Query::terms("status", ["notAnArrayList"])]);
    }

    #[test]
    fn test_top_level_must_not_uses_configured_field() {
        let config = CompilerConfig { exclusion_field: "state".into(), ..Default::default() };
        let query = QueryCompiler::compile(Some(&filters(json!({"must_not": ["x"]}))), &config).unwrap();
        assert_eq!(query, Query::Bool(BoolQuery::new().must_not(Query::terms("state", ["x"]))));
    }

    #[test]
    fn test_top_level_must_not_per_field_map() {
        let root = compile(json!({"must_not": {"type": "spam", "tags": ["a", "b"]}})).unwrap();
        assert_eq!(
            root.must_not,
            vec![Query::terms("type", ["spam"]), Query::terms("tags", ["a", "b"])]
        );
    }

    #[test]
    fn test_field_scoped_must_not() {
        let root = compile(json!({"status": {"must_not": ["draft", "deleted"]}})).unwrap();
        assert!(root.must.is_empty());
        assert_eq!(root.must_not, vec![Query::terms("status", ["draft", "deleted"])]);
    }

    #[test]
    fn test_nested_boolean_leaf() {
        let root = compile(json!({"field1": {"nestedField": true}})).unwrap();
        assert_eq!(root.must, vec![Query::term("field1.nestedField", true)]);
    }

    #[test]
    fn test_nested_string_leaf_is_malformed() {
        let err = compile(json!({"field1": {"nestedField": "nestedValue"}})).unwrap_err();
        assert_eq!(
            err,
            QueryError::MalformedFilterShape {
                field: "field1.nestedField".into(),
                expected: "boolean nested leaf",
                found: "string",
            }
        );
    }

    #[test]
    fn test_nested_array_leaf_is_malformed() {
        let err = compile(json!({"field1": {"nestedField": ["val1", "val2"]}})).unwrap_err();
        assert!(matches!(err, QueryError::MalformedFilterShape { found: "array", .. }));
    }

    #[test]
    fn test_null_value_is_malformed() {
        let err = compile(json!({"field1": null})).unwrap_err();
        assert!(matches!(err, QueryError::MalformedFilterShape { found: "null", .. }));
    }

    #[test]
    fn test_bool_composition_merges_into_root() {
        let root = compile(json!({
            "status": "active",
            "bool": {
                "must": [{"match": {"title": "rust"}}],
                "filter": [{"term": {"lang": "en"}}],
                "should": [{"terms": {"tags": ["a", "b"]}}],
                "must_not": [{"range": {"age": {"lt": 18}}}]
            }
        }))
        .unwrap();

        assert_eq!(root.must, vec![Query::term("status", "active"), Query::match_text("title", "rust")]);
        assert_eq!(root.filter, vec![Query::term("lang", "en")]);
        assert_eq!(root.should, vec![Query::terms("tags", ["a", "b"])]);
        assert_eq!(root.must_not, vec![Query::range("age", RangeBounds::new().lt(18))]);
    }

    #[test]
    fn test_nested_bool_part() {
        let root = compile(json!({
            "bool": {"should": [{"bool": {"must": [{"term": {"a": 1}}, {"term": {"b": 2}}]}}]}
        }))
        .unwrap();
        assert_eq!(
            root.should,
            vec![Query::Bool(BoolQuery::new().must(Query::term("a", 1)).must(Query::term("b", 2)))]
        );
    }

    #[test]
    fn test_unsupported_query_type() {
        let err = compile(json!({"bool": {"must": [{"fuzzy": {"name": "bob"}}]}})).unwrap_err();
        assert_eq!(err, QueryError::UnsupportedQueryType("fuzzy".into()));
    }

    #[test]
    fn test_unsupported_query_type_with_empty_body() {
        let err = compile(json!({"bool": {"filter": [{"wildcard": {}}]}})).unwrap_err();
        assert_eq!(err, QueryError::UnsupportedQueryType("wildcard".into()));
    }

    #[test]
    fn test_empty_bool_part_rejected() {
        let err = compile(json!({"bool": {"must": [{}]}})).unwrap_err();
        assert!(matches!(err, QueryError::MalformedFilterShape { .. }));
    }

    #[test]
    fn test_leaf_part_without_fields_rejected() {
        let err = compile(json!({"bool": {"should": [{"term": {}}]}})).unwrap_err();
        assert!(matches!(err, QueryError::MalformedFilterShape { .. }));
    }

    #[test]
    fn test_unsupported_bool_slot() {
        let err = compile(json!({"bool": {"maybe": []}})).unwrap_err();
        assert_eq!(err, QueryError::UnsupportedQueryType("bool.maybe".into()));
    }

    #[test]
    fn test_range_part_with_bad_operator() {
        let err = compile(json!({"bool": {"filter": [{"range": {"age": {"eq": 3}}}]}})).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedRangeOperator { .. }));
    }

    #[test]
    fn test_free_text_single_field() {
        let config = CompilerConfig { free_text_fields: vec!["title".into()], ..Default::default() };
        let criteria = SearchCriteria::new().search("  TestSearch ");
        let query = QueryCompiler::compile_criteria(&criteria, &config).unwrap();
        assert_eq!(query, Query::Bool(BoolQuery::new().must(Query::match_text("title", "TestSearch"))));
    }

    #[test]
    fn test_free_text_multi_field_should() {
        let config = CompilerConfig {
            free_text_fields: vec!["title".into(), "description".into()],
            ..Default::default()
        };
        let criteria = SearchCriteria::new().filter("status", json!("active")).search("rust");
        let query = QueryCompiler::compile_criteria(&criteria, &config).unwrap();

        let expected_text = Query::Bool(
            BoolQuery::new()
                .should(Query::match_text("title", "rust"))
                .should(Query::match_text("description", "rust")),
        );
        assert_eq!(
            query,
            Query::Bool(BoolQuery::new().must(Query::term("status", "active")).must(expected_text))
        );
    }

    #[test]
    fn test_blank_free_text_adds_nothing() {
        let criteria = SearchCriteria::new().search("   ");
        let query = QueryCompiler::compile_criteria(&criteria, &CompilerConfig::default()).unwrap();
        assert!(query.is_match_all());
    }
}
