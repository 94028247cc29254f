// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Request assembler
//!
//! Pairs a compiled [`Query`] with pagination, projection, sort and facet
//! aggregations. The result is backend-neutral; backends translate it to
//! their own wire format.

use serde::{Deserialize, Serialize};

use super::query::Query;
use crate::config::CompilerConfig;
use crate::criteria::{SearchCriteria, SortBy};

/// Everything a backend needs to run one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub index: String,
    pub query: Query,
    /// Offset of the first hit; `None` leaves the backend default
    pub from: Option<u64>,
    /// Page size; `None` leaves the backend default
    pub size: Option<u64>,
    /// Source fields to return; `None` returns every field
    pub source_includes: Option<Vec<String>>,
    pub sort: Option<SortBy>,
    pub aggregations: Vec<TermsAggregation>,
}

/// Distinct-value count over one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsAggregation {
    /// Response key the buckets come back under
    pub name: String,
    pub field: String,
    pub size: Option<u32>,
}

impl SearchRequest {
    /// Bare request: query only, every other setting at backend defaults.
    pub fn new(index: impl Into<String>, query: Query) -> Self {
        Self {
            index: index.into(),
            query,
            from: None,
            size: None,
            source_includes: None,
            sort: None,
            aggregations: Vec::new(),
        }
    }

    /// Same request against another index.
    pub fn for_index(&self, index: impl Into<String>) -> Self {
        Self { index: index.into(), ..self.clone() }
    }

    pub fn aggregation(&self, name: &str) -> Option<&TermsAggregation> {
        self.aggregations.iter().find(|agg| agg.name == name)
    }
}

/// Builds a [`SearchRequest`] from a compiled query and the caller's criteria.
pub struct RequestAssembler;

impl RequestAssembler {
    pub fn assemble(
        index: &str,
        query: Query,
        criteria: &SearchCriteria,
        config: &CompilerConfig,
    ) -> SearchRequest {
        let mut request = SearchRequest::new(index, query);

        // Pagination is all or nothing: without a page number and a non-zero
        // page size, both from and size stay at backend defaults.
        if let (Some(page), Some(size)) = (criteria.page_number, criteria.page_size.filter(|s| *s > 0)) {
            request.size = Some(u64::from(size));
            request.from = Some(u64::from(page) * u64::from(size));
        }

        if !criteria.requested_fields.is_empty() {
            request.source_includes = Some(criteria.requested_fields.clone());
        }

        request.sort = criteria.sort_by.clone();

        request.aggregations = criteria
            .facet_fields()
            .into_iter()
            .map(|field| TermsAggregation {
                name: config.facet_agg_name(field),
                field: field.to_string(),
                size: config.facet_size,
            })
            .collect();

        request
    }
}
