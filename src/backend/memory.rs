// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory search backend.
//!
//! Evaluates the Query AST directly against JSON documents held in a
//! [`DashMap`] of indices. Behaves like a small Elasticsearch:
//!
//! - `term`/`terms` compare exactly; array fields match if any element does
//! - `match` lowercases and splits on non-alphanumerics, any shared token hits
//! - aggregations run over every match, not just the returned page
//! - buckets come back ordered by count desc, then key asc
//! - missing `size` defaults to 10, for hits and for buckets alike

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::SearchBackend;
use crate::criteria::{Document, SortBy, SortOrder};
use crate::error::BackendError;
use crate::search::{
    Aggregate, BoolQuery, Bucket, FieldValue, Query, RangeBounds, RawHit, RawResponse,
    SearchRequest, TermsAggregation,
};

const DEFAULT_SIZE: usize = 10;

/// Offsets beyond the address space saturate instead of wrapping.
fn saturating_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

pub struct InMemoryBackend {
    indices: DashMap<String, Vec<(String, Document)>>,
    available: AtomicBool,
    /// Calls left that fail with a connection error before succeeding
    failures_pending: AtomicUsize,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            indices: DashMap::new(),
            available: AtomicBool::new(true),
            failures_pending: AtomicUsize::new(0),
        }
    }

    pub fn create_index(&self, index: &str) {
        self.indices.entry(index.to_string()).or_default();
    }

    pub fn drop_index(&self, index: &str) {
        self.indices.remove(index);
    }

    /// Add a document, creating the index on first use.
    ///
    /// Non-object values are stored as empty documents.
    pub fn insert(&self, index: &str, id: impl Into<String>, document: Value) {
        let document = match document {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.indices
            .entry(index.to_string())
            .or_default()
            .push((id.into(), document));
    }

    pub fn index_documents<I, S>(&self, index: &str, documents: I)
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        for (id, document) in documents {
            self.insert(index, id, document);
        }
    }

    /// Get document count for an index
    #[must_use]
    pub fn len(&self, index: &str) -> usize {
        self.indices.get(index).map(|docs| docs.len()).unwrap_or(0)
    }

    /// Simulate the cluster going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Fail the next `count` calls with a connection error.
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    fn ensure_reachable(&self) -> Result<(), BackendError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("in-memory backend switched off".into()));
        }
        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(BackendError::Connection("injected failure".into()));
        }
        Ok(())
    }

    fn run(docs: &[(String, Document)], request: &SearchRequest) -> RawResponse {
        let mut matched: Vec<&(String, Document)> = docs
            .iter()
            .filter(|(_, doc)| matches(&request.query, doc))
            .collect();

        if let Some(sort) = &request.sort {
            sort_hits(&mut matched, sort);
        }

        let aggregations = request
            .aggregations
            .iter()
            .map(|agg| (agg.name.clone(), aggregate(&matched, agg)))
            .collect();

        let from = saturating_usize(request.from.unwrap_or(0));
        let size = request.size.map(saturating_usize).unwrap_or(DEFAULT_SIZE);
        let hits = matched
            .iter()
            .skip(from)
            .take(size)
            .map(|(id, doc)| RawHit {
                id: Some(id.clone()),
                source: Some(project(doc, request.source_includes.as_deref())),
            })
            .collect();

        RawResponse {
            total: matched.len() as u64,
            hits,
            aggregations,
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn search(&self, request: &SearchRequest) -> Result<RawResponse, BackendError> {
        self.ensure_reachable()?;
        let docs = self.indices.get(&request.index).ok_or_else(|| BackendError::Status {
            status: 404,
            body: format!("no such index [{}]", request.index),
        })?;
        Ok(Self::run(docs.value(), request))
    }

    async fn check_index(&self, index: &str) -> Result<bool, BackendError> {
        self.ensure_reachable()?;
        Ok(self.indices.contains_key(index))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════

fn matches(query: &Query, doc: &Document) -> bool {
    match query {
        Query::Term { field, value } => leaves(doc, field).any(|v| value_eq(v, value)),
        Query::Terms { field, values } => {
            leaves(doc, field).any(|v| values.iter().any(|wanted| value_eq(v, wanted)))
        }
        Query::Match { field, value } => {
            let wanted = tokens(&value.to_string());
            text_fields(doc, field).any(|text| tokens(text).iter().any(|t| wanted.contains(t)))
        }
        Query::Range { field, bounds } => leaves(doc, field).any(|v| in_range(v, bounds)),
        Query::Bool(b) => matches_bool(b, doc),
    }
}

fn matches_bool(b: &BoolQuery, doc: &Document) -> bool {
    let required = b.must.iter().chain(&b.filter).all(|q| matches(q, doc));
    let excluded = b.must_not.iter().any(|q| matches(q, doc));
    // should is only mandatory when nothing else constrains the match
    let optional_ok = b.should.is_empty()
        || !b.must.is_empty()
        || !b.filter.is_empty()
        || b.should.iter().any(|q| matches(q, doc));
    required && !excluded && optional_ok
}

/// Value at a dotted path; array elements are yielded individually.
fn leaves<'a>(doc: &'a Document, path: &str) -> impl Iterator<Item = &'a Value> {
    let found = lookup(doc, path);
    let items: Vec<&Value> = match found {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v) => vec![v],
        None => vec![],
    };
    items.into_iter()
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    if let Some(v) = doc.get(path) {
        return Some(v);
    }
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Text leaves for `field`, which may be a `*` pattern over top-level keys.
fn text_fields<'a>(doc: &'a Document, field: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    if field.contains('*') {
        Box::new(
            doc.iter()
                .filter(move |(key, _)| glob_match(field, key))
                .flat_map(|(_, v)| string_leaves(v)),
        )
    } else {
        Box::new(leaves(doc, field).filter_map(Value::as_str))
    }
}

fn string_leaves(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().flat_map(string_leaves).collect(),
        Value::Object(map) => map.values().flat_map(string_leaves).collect(),
        _ => vec![],
    }
}

fn glob_match(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            return rest.ends_with(part);
        }
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.is_empty()
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn value_eq(stored: &Value, wanted: &FieldValue) -> bool {
    match (FieldValue::from_json(stored), wanted) {
        (Some(FieldValue::Text(a)), FieldValue::Text(b)) => &a == b,
        (Some(FieldValue::Boolean(a)), FieldValue::Boolean(b)) => a == *b,
        (Some(stored), wanted) => match (stored.as_f64(), wanted.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (None, _) => false,
    }
}

fn compare(stored: &FieldValue, bound: &FieldValue) -> Option<CmpOrdering> {
    match (stored, bound) {
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
        (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
        _ => stored.as_f64()?.partial_cmp(&bound.as_f64()?),
    }
}

fn in_range(stored: &Value, bounds: &RangeBounds) -> bool {
    let Some(stored) = FieldValue::from_json(stored) else {
        return false;
    };
    let check = |bound: &Option<FieldValue>, accept: fn(CmpOrdering) -> bool| {
        bound
            .as_ref()
            .map_or(true, |b| compare(&stored, b).is_some_and(accept))
    };
    check(&bounds.gt, CmpOrdering::is_gt)
        && check(&bounds.gte, CmpOrdering::is_ge)
        && check(&bounds.lt, CmpOrdering::is_lt)
        && check(&bounds.lte, CmpOrdering::is_le)
}

// ═══════════════════════════════════════════════════════════════════════════
// SORT / PROJECTION / AGGREGATION
// ═══════════════════════════════════════════════════════════════════════════

fn sort_hits(hits: &mut [&(String, Document)], sort: &SortBy) {
    hits.sort_by(|(_, a), (_, b)| {
        let a = lookup(a, &sort.field).and_then(FieldValue::from_json);
        let b = lookup(b, &sort.field).and_then(FieldValue::from_json);
        // missing values sort last in either direction
        match (a, b) {
            (Some(a), Some(b)) => {
                let ord = compare(&a, &b).unwrap_or(CmpOrdering::Equal);
                match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            }
            (Some(_), None) => CmpOrdering::Less,
            (None, Some(_)) => CmpOrdering::Greater,
            (None, None) => CmpOrdering::Equal,
        }
    });
}

fn project(doc: &Document, includes: Option<&[String]>) -> Document {
    let Some(includes) = includes else {
        return doc.clone();
    };
    let mut out = Map::new();
    for path in includes {
        if let Some(v) = doc.get(path) {
            out.insert(path.clone(), v.clone());
            continue;
        }
        if let Some(v) = lookup(doc, path) {
            insert_path(&mut out, path, v.clone());
        }
    }
    out
}

fn insert_path(out: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, tail)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, tail, value);
            }
        }
    }
}

fn aggregate(matched: &[&(String, Document)], agg: &TermsAggregation) -> Aggregate {
    let mut counts: HashMap<String, (FieldValue, u64)> = HashMap::new();
    for (_, doc) in matched {
        let mut seen = HashSet::new();
        for value in leaves(doc, &agg.field).filter_map(FieldValue::from_json) {
            let key = value.to_string();
            if seen.insert(key.clone()) {
                counts.entry(key).or_insert((value, 0)).1 += 1;
            }
        }
    }

    let mut buckets: Vec<(String, FieldValue, u64)> =
        counts.into_iter().map(|(k, (v, c))| (k, v, c)).collect();
    buckets.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    let size = agg.size.map(|s| s as usize).unwrap_or(DEFAULT_SIZE);

    Aggregate::Terms(
        buckets
            .into_iter()
            .take(size)
            .map(|(_, key, doc_count)| Bucket { key, doc_count })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend.index_documents(
            "posts",
            vec![
                ("1", json!({"title": "Rust search engines", "status": "active", "views": 120, "tags": ["rust", "search"], "meta": {"pinned": true}})),
                ("2", json!({"title": "Cooking pasta", "status": "draft", "views": 15, "tags": ["food"], "meta": {"pinned": false}})),
                ("3", json!({"title": "Async Rust", "status": "active", "views": 300, "tags": ["rust", "async"]})),
                ("4", json!({"title": "Deleted post", "status": "deleted", "views": 0, "tags": []})),
            ],
        );
        backend
    }

    fn request(query: Query) -> SearchRequest {
        SearchRequest::new("posts", query)
    }

    fn ids(response: &RawResponse) -> Vec<&str> {
        response.hits.iter().filter_map(|h| h.id.as_deref()).collect()
    }

    #[tokio::test]
    async fn test_match_all_returns_everything() {
        let response = seeded().search(&request(Query::match_all())).await.unwrap();
        assert_eq!(response.total, 4);
        assert_eq!(ids(&response), vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_term_and_terms() {
        let backend = seeded();
        let response = backend.search(&request(Query::term("status", "active"))).await.unwrap();
        assert_eq!(ids(&response), vec!["1", "3"]);

        let response = backend.search(&request(Query::terms("tags", ["food", "async"]))).await.unwrap();
        assert_eq!(ids(&response), vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_nested_term() {
        let response = seeded().search(&request(Query::term("meta.pinned", true))).await.unwrap();
        assert_eq!(ids(&response), vec!["1"]);
    }

    #[tokio::test]
    async fn test_range() {
        let query = Query::range("views", RangeBounds::new().gte(15).lt(300));
        let response = seeded().search(&request(query)).await.unwrap();
        assert_eq!(ids(&response), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_match_tokenizes_and_lowercases() {
        let backend = seeded();
        let response = backend.search(&request(Query::match_text("title", "RUST"))).await.unwrap();
        assert_eq!(ids(&response), vec!["1", "3"]);

        let response = backend.search(&request(Query::match_text("*", "pasta"))).await.unwrap();
        assert_eq!(ids(&response), vec!["2"]);
    }

    #[tokio::test]
    async fn test_bool_must_not_and_should() {
        let query = Query::Bool(
            BoolQuery::new()
                .should(Query::term("status", "active"))
                .should(Query::term("status", "draft"))
                .must_not(Query::terms("tags", ["async"])),
        );
        let response = seeded().search(&request(query)).await.unwrap();
        assert_eq!(ids(&response), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_pagination_keeps_full_total() {
        let mut req = request(Query::match_all());
        req.from = Some(1);
        req.size = Some(2);
        let response = seeded().search(&req).await.unwrap();
        assert_eq!(response.total, 4);
        assert_eq!(ids(&response), vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_huge_offset_and_size_saturate() {
        let mut req = request(Query::match_all());
        req.size = Some(u64::MAX);
        let response = seeded().search(&req).await.unwrap();
        assert_eq!(response.hits.len(), 4);

        req.from = Some(u64::MAX);
        let response = seeded().search(&req).await.unwrap();
        assert_eq!(response.total, 4);
        assert!(response.hits.is_empty());
    }

    #[tokio::test]
    async fn test_sort_desc_missing_last() {
        let backend = seeded();
        backend.insert("posts", "5", json!({"title": "No views"}));
        let mut req = request(Query::match_all());
        req.sort = Some(SortBy { field: "views".into(), order: SortOrder::Desc });
        let response = backend.search(&req).await.unwrap();
        assert_eq!(ids(&response), vec!["3", "1", "2", "4", "5"]);
    }

    #[tokio::test]
    async fn test_projection() {
        let mut req = request(Query::term("status", "draft"));
        req.source_includes = Some(vec!["title".into(), "meta.pinned".into()]);
        let response = seeded().search(&req).await.unwrap();
        assert_eq!(
            Value::Object(response.hits[0].source.clone().unwrap()),
            json!({"title": "Cooking pasta", "meta": {"pinned": false}})
        );
    }

    #[tokio::test]
    async fn test_terms_aggregation_over_all_matches() {
        let mut req = request(Query::match_all());
        req.size = Some(1);
        req.aggregations = vec![TermsAggregation { name: "tags_agg".into(), field: "tags".into(), size: None }];
        let response = seeded().search(&req).await.unwrap();
        assert_eq!(
            response.aggregations["tags_agg"],
            Aggregate::Terms(vec![
                Bucket::new("rust", 2),
                Bucket::new("async", 1),
                Bucket::new("food", 1),
                Bucket::new("search", 1),
            ])
        );
    }

    #[tokio::test]
    async fn test_missing_index_is_404() {
        let err = seeded().search(&SearchRequest::new("nope", Query::match_all())).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_check_index() {
        let backend = seeded();
        assert!(backend.check_index("posts").await.unwrap());
        assert!(!backend.check_index("nope").await.unwrap());

        backend.set_available(false);
        assert!(matches!(backend.check_index("posts").await, Err(BackendError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_fail_next_is_transient_then_recovers() {
        let backend = seeded();
        backend.fail_next(1);
        let err = backend.check_index("posts").await.unwrap_err();
        assert!(err.is_transient());
        assert!(backend.check_index("posts").await.unwrap());
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("title*", "title_en"));
        assert!(glob_match("*_en", "title_en"));
        assert!(!glob_match("title*", "subtitle"));
        assert!(glob_match("title", "title"));
        assert!(!glob_match("title", "titles"));
    }
}
