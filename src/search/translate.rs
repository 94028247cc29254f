// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Elasticsearch Translator
//!
//! Translates the Query AST and a [`SearchRequest`] to Elasticsearch
//! `_search` JSON.
//!
//! # Query DSL
//!
//! ```text
//! Term  { f, v }        → {"term":  {f: v}}
//! Terms { f, [v..] }    → {"terms": {f: [v..]}}
//! Match { f, v }        → {"match": {f: v}}
//! Match { "*"/"a*", v } → {"multi_match": {"query": v, "fields": ["a*"]}}
//! Range { f, bounds }   → {"range": {f: {"gte": .., "lt": ..}}}
//! Bool  { slots }       → {"bool":  {"must": [..], "must_not": [..], ..}}
//! ```

use serde_json::{json, Map, Value};

use super::query::{BoolQuery, Query, RangeBounds};
use super::request::SearchRequest;
use crate::criteria::SortBy;

/// Elasticsearch query translator
pub struct ElasticTranslator;

impl ElasticTranslator {
    /// Translate a Query AST node to Elasticsearch query DSL
    pub fn translate(query: &Query) -> Value {
        match query {
            Query::Term { field, value } => json!({ "term": { field: value.to_json() } }),
            Query::Terms { field, values } => {
                let values: Vec<Value> = values.iter().map(|v| v.to_json()).collect();
                json!({ "terms": { field: values } })
            }
            Query::Match { field, value } => {
                // match does not accept wildcard field patterns
                if field.contains('*') {
                    json!({ "multi_match": { "query": value.to_json(), "fields": [field] } })
                } else {
                    json!({ "match": { field: value.to_json() } })
                }
            }
            Query::Range { field, bounds } => json!({ "range": { field: Self::translate_bounds(bounds) } }),
            Query::Bool(bool_query) => Self::translate_bool(bool_query),
        }
    }

    fn translate_bool(bool_query: &BoolQuery) -> Value {
        let mut slots = Map::new();
        for (name, clauses) in [
            ("must", &bool_query.must),
            ("filter", &bool_query.filter),
            ("should", &bool_query.should),
            ("must_not", &bool_query.must_not),
        ] {
            if !clauses.is_empty() {
                slots.insert(
                    name.to_string(),
                    Value::Array(clauses.iter().map(Self::translate).collect()),
                );
            }
        }
        json!({ "bool": slots })
    }

    fn translate_bounds(bounds: &RangeBounds) -> Value {
        let mut out = Map::new();
        for (name, bound) in [
            ("gt", &bounds.gt),
            ("gte", &bounds.gte),
            ("lt", &bounds.lt),
            ("lte", &bounds.lte),
        ] {
            if let Some(value) = bound {
                out.insert(name.to_string(), value.to_json());
            }
        }
        Value::Object(out)
    }

    fn translate_sort(sort: &SortBy) -> Value {
        json!([{ sort.field.as_str(): { "order": sort.order.as_str() } }])
    }

    /// Translate a full request into the `_search` body.
    ///
    /// The index is not part of the body; it goes in the URL path.
    pub fn request_body(request: &SearchRequest) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), Self::translate(&request.query));
        body.insert("track_total_hits".into(), Value::Bool(true));

        if let Some(from) = request.from {
            body.insert("from".into(), Value::from(from));
        }
        if let Some(size) = request.size {
            body.insert("size".into(), Value::from(size));
        }
        if let Some(includes) = &request.source_includes {
            body.insert("_source".into(), json!({ "includes": includes }));
        }
        if let Some(sort) = &request.sort {
            body.insert("sort".into(), Self::translate_sort(sort));
        }
        if !request.aggregations.is_empty() {
            let aggs: Map<String, Value> = request
                .aggregations
                .iter()
                .map(|agg| {
                    let mut terms = Map::new();
                    terms.insert("field".into(), Value::String(agg.field.clone()));
                    if let Some(size) = agg.size {
                        terms.insert("size".into(), Value::from(size));
                    }
                    (agg.name.clone(), json!({ "terms": terms }))
                })
                .collect();
            body.insert("aggs".into(), Value::Object(aggs));
        }

        Value::Object(body)
    }
}
