// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Backend-neutral search response.
//!
//! Backends decode their wire payload into [`RawResponse`]; the extractor
//! only ever sees this shape.

use serde_json::Value;
use std::collections::HashMap;

use super::query::FieldValue;
use crate::criteria::Document;
use crate::error::BackendError;

/// Search response as reported by a backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    /// Total matching documents, independent of the page returned
    pub total: u64,
    pub hits: Vec<RawHit>,
    pub aggregations: HashMap<String, Aggregate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHit {
    pub id: Option<String>,
    /// Stored document; `None` when the backend returned no source
    pub source: Option<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// Distinct-value buckets, in backend order
    Terms(Vec<Bucket>),
    /// Any aggregation kind the extractor does not interpret
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: FieldValue,
    pub doc_count: u64,
}

impl Bucket {
    pub fn new(key: impl Into<FieldValue>, doc_count: u64) -> Self {
        Self { key: key.into(), doc_count }
    }
}

impl RawResponse {
    /// Decode an Elasticsearch `_search` response body.
    ///
    /// ```text
    /// hits.total            → {"value": n, "relation": "eq"} or bare n
    /// hits.hits[]           → _id, _source
    /// aggregations.<name>   → buckets[] with key / key_as_string, doc_count
    /// ```
    pub fn from_elastic(body: &Value) -> Result<Self, BackendError> {
        let hits = body
            .get("hits")
            .ok_or_else(|| BackendError::Protocol("response has no 'hits' section".into()))?;

        let total = match hits.get("total") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::Object(t)) => t.get("value").and_then(Value::as_u64),
            _ => None,
        }
        .ok_or_else(|| BackendError::Protocol("response has no usable 'hits.total'".into()))?;

        let hits = hits
            .get("hits")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::decode_hit).collect())
            .unwrap_or_default();

        let aggregations = body
            .get("aggregations")
            .and_then(Value::as_object)
            .map(|aggs| {
                aggs.iter()
                    .map(|(name, agg)| (name.clone(), Self::decode_aggregate(agg)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { total, hits, aggregations })
    }

    fn decode_hit(hit: &Value) -> RawHit {
        RawHit {
            id: hit.get("_id").and_then(Value::as_str).map(str::to_string),
            source: hit.get("_source").and_then(Value::as_object).cloned(),
        }
    }

    fn decode_aggregate(agg: &Value) -> Aggregate {
        let Some(buckets) = agg.get("buckets").and_then(Value::as_array) else {
            return Aggregate::Other;
        };
        Aggregate::Terms(
            buckets
                .iter()
                .map(|bucket| {
                    let key = bucket
                        .get("key_as_string")
                        .or_else(|| bucket.get("key"))
                        .and_then(FieldValue::from_json)
                        .unwrap_or_else(|| FieldValue::Text(String::new()));
                    let doc_count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
                    Bucket { key, doc_count }
                })
                .collect(),
        )
    }
}
