// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query AST
//!
//! Backend-neutral query tree produced by the compiler and consumed by the
//! request assembler, the Elasticsearch translator and the in-memory backend.
//!
//! # Example
//!
//! ```rust
//! use criteria_search::search::{Query, RangeBounds, FieldValue};
//!
//! // Simple field query
//! let query = Query::term("status", "active");
//!
//! // Boolean combinations
//! let query = Query::term("status", "active")
//!     .and(Query::range("age", RangeBounds::new().gte(25).lte(40)))
//!     .and(Query::term("deleted", true).negate());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Search query AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Exact match on one value
    Term { field: String, value: FieldValue },
    /// Membership: field equals any of the values
    Terms { field: String, values: Vec<FieldValue> },
    /// Analyzed full-text match
    Match { field: String, value: FieldValue },
    /// Inequality bounds on one field, combined conjunctively
    Range { field: String, bounds: RangeBounds },
    /// Boolean composition
    Bool(BoolQuery),
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::Term { field: field.into(), value: value.into() }
    }

    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn match_text(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::Match { field: field.into(), value: value.into() }
    }

    pub fn range(field: impl Into<String>, bounds: RangeBounds) -> Self {
        Self::Range { field: field.into(), bounds }
    }

    /// Empty bool: matches every document
    pub fn match_all() -> Self {
        Self::Bool(BoolQuery::default())
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::Bool(b) if b.is_empty())
    }

    /// Combine with AND
    pub fn and(self, other: Query) -> Self {
        match self {
            Self::Bool(mut b) if b.should.is_empty() => {
                b.must.push(other);
                Self::Bool(b)
            }
            this => Self::Bool(BoolQuery::default().must(this).must(other)),
        }
    }

    /// Combine with OR
    pub fn or(self, other: Query) -> Self {
        Self::Bool(BoolQuery::default().should(self).should(other))
    }

    /// Negate query
    pub fn negate(self) -> Self {
        Self::Bool(BoolQuery::default().must_not(self))
    }

    /// Field this clause targets (None for bool nodes).
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Term { field, .. }
            | Self::Terms { field, .. }
            | Self::Match { field, .. }
            | Self::Range { field, .. } => Some(field),
            Self::Bool(_) => None,
        }
    }
}

/// Boolean composition of sub-clauses.
///
/// `must` and `filter` are conjunctive, `should` is disjunctive (at least one
/// must hold when there is no `must`/`filter`), `must_not` excludes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Query>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    /// Append every slot of `other` onto the matching slot of `self`.
    pub fn merge(&mut self, other: BoolQuery) {
        self.must.extend(other.must);
        self.filter.extend(other.filter);
        self.should.extend(other.should);
        self.must_not.extend(other.must_not);
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.filter.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
    }
}

/// Range comparator bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<FieldValue>,
}

impl RangeBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gt(mut self, value: impl Into<FieldValue>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn gte(mut self, value: impl Into<FieldValue>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<FieldValue>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<FieldValue>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// No bound set: the range accepts everything.
    pub fn is_unbounded(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }
}

/// Scalar leaf value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Scalar JSON → leaf value; `None` for null, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Integer(i)),
                None => n.as_f64().map(Self::Float),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Boolean(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
