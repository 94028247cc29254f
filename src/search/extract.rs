// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Result extractor
//!
//! Turns a [`RawResponse`] into the caller-facing [`SearchResult`].
//!
//! ```text
//! total        → totalCount (as reported, never hits.len())
//! hits[].source → data (order kept, missing source → {})
//! <facet>_agg  → facets[<facet>] = [(key, doc_count), ...] minus blank keys
//! ```

use super::response::{Aggregate, RawResponse};
use crate::config::CompilerConfig;
use crate::criteria::{FacetResult, FacetValue, SearchCriteria, SearchResult};

pub struct ResultExtractor;

impl ResultExtractor {
    pub fn extract(
        raw: RawResponse,
        criteria: &SearchCriteria,
        config: &CompilerConfig,
    ) -> SearchResult {
        let facets = Self::extract_facets(&raw, criteria, config);
        let data = raw
            .hits
            .into_iter()
            .map(|hit| hit.source.unwrap_or_default())
            .collect();

        SearchResult {
            total_count: raw.total,
            data,
            facets,
        }
    }

    /// Facets absent from the response, or not terms-shaped, are left out.
    pub fn extract_facets(
        raw: &RawResponse,
        criteria: &SearchCriteria,
        config: &CompilerConfig,
    ) -> FacetResult {
        let mut facets = FacetResult::new();
        if criteria.facets.is_empty() {
            return facets;
        }

        for field in criteria.facet_fields() {
            let Some(Aggregate::Terms(buckets)) = raw.aggregations.get(&config.facet_agg_name(field))
            else {
                continue;
            };
            let values = buckets
                .iter()
                .filter_map(|bucket| {
                    let value = bucket.key.to_string();
                    if value.trim().is_empty() {
                        None
                    } else {
                        Some(FacetValue::new(value, bucket.doc_count))
                    }
                })
                .collect();
            facets.insert(field.to_string(), values);
        }
        facets
    }
}
