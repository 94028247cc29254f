// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search criteria and result types.
//!
//! These are the caller-facing shapes: [`SearchCriteria`] goes in,
//! [`SearchResult`] comes out. Both (de)serialize as camelCase JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Dynamic, recursively nested filter description.
pub type FilterMap = Map<String, Value>;

/// A returned document (opaque field → value mapping).
pub type Document = Map<String, Value>;

/// Facet field → ordered (value, count) pairs.
pub type FacetResult = HashMap<String, Vec<FacetValue>>;

/// One search request, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    /// Fields to return; empty means all fields
    #[serde(deserialize_with = "null_as_default")]
    pub requested_fields: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub filter_criteria_map: FilterMap,
    /// Fields to aggregate into facets
    #[serde(deserialize_with = "null_as_default")]
    pub facets: Vec<String>,
    pub search_string: Option<String>,
    pub sort_by: Option<SortBy>,
}

/// Explicit `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, number: u32, size: u32) -> Self {
        self.page_number = Some(number);
        self.page_size = Some(size);
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filter_criteria_map.insert(field.into(), value);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn facet(mut self, field: impl Into<String>) -> Self {
        self.facets.push(field.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_string = Some(text.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(SortBy { field: field.into(), order });
        self
    }

    /// Requested facets with duplicates removed, first occurrence wins.
    pub fn facet_fields(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.facets.len());
        for facet in &self.facets {
            if !seen.contains(&facet.as_str()) {
                seen.push(facet);
            }
        }
        seen
    }

    /// Free text, if any survives trimming.
    pub fn free_text(&self) -> Option<&str> {
        self.search_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Sort field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One facet bucket: a distinct value and how many documents carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

impl FacetValue {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self { value: value.into(), count }
    }
}

/// Typed search outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Exact total reported by the backend, independent of page size
    pub total_count: u64,
    pub data: Vec<Document>,
    pub facets: FacetResult,
}
