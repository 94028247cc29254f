// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy.
//!
//! Compile-time failures ([`QueryError`]) are raised before any backend call,
//! so a malformed filter never reaches the engine. Backend failures
//! ([`BackendError`]) are propagated untouched; only the index presence probe
//! folds them into `false`.

use thiserror::Error;

/// Filter map could not be compiled into a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unsupported query type: {0}")]
    UnsupportedQueryType(String),
    #[error("Unsupported range condition: '{operator}' on field '{field}'")]
    UnsupportedRangeOperator { field: String, operator: String },
    #[error("Malformed filter for '{field}': expected {expected}, got {found}")]
    MalformedFilterShape {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl QueryError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedQueryType(_) => "unsupported_query_type",
            Self::UnsupportedRangeOperator { .. } => "unsupported_range_operator",
            Self::MalformedFilterShape { .. } => "malformed_filter_shape",
        }
    }

    pub(crate) fn malformed(
        field: impl Into<String>,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Self::MalformedFilterShape {
            field: field.into(),
            expected,
            found: json_kind(value),
        }
    }
}

/// Communication with the search backend failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend connection error: {0}")]
    Connection(String),
    #[error("Backend request timed out: {0}")]
    Timeout(String),
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Backend protocol error: {0}")]
    Protocol(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) | Self::Unavailable(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Protocol(_) => false,
        }
    }
}

/// Error returned by [`crate::SearchService::search_documents`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
