// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Criteria compilation, request assembly and result extraction. Nothing in
//! this module performs I/O; backends live in [`crate::backend`].
//!
//! # Architecture
//!
//! ```text
//! SearchCriteria
//!     ↓
//! QueryCompiler      filters + free text → Query AST
//!     ↓
//! RequestAssembler   + pagination, projection, sort, facet aggregations
//!     ↓
//! SearchBackend      ├─→ ElasticTranslator → _search JSON
//!     ↓              └─→ in-memory evaluation
//! RawResponse
//!     ↓
//! ResultExtractor    → SearchResult { totalCount, data, facets }
//! ```
//!
//! # Filter Language
//!
//! ```text
//! {"status": "active"}                     - Field equals
//! {"tags": ["rust", "db"]}                 - Field is any of
//! {"age": {"gte": 25, "lte": 40}}          - Range
//! {"status": {"must_not": ["deleted"]}}    - Field is none of
//! {"must_not": ["archived"]}               - Exclusion on the configured field
//! {"meta": {"verified": true}}             - Nested boolean leaf
//! {"bool": {"should": [{"term": {..}}]}}   - Raw boolean composition
//! ```

mod compiler;
mod extract;
mod query;
mod range;
mod request;
mod response;
mod translate;

pub use compiler::QueryCompiler;
pub use extract::ResultExtractor;
pub use query::{BoolQuery, FieldValue, Query, RangeBounds};
pub use range::{build_range, is_range_operator, RANGE_OPERATORS};
pub use request::{RequestAssembler, SearchRequest, TermsAggregation};
pub use response::{Aggregate, Bucket, RawHit, RawResponse};
pub use translate::ElasticTranslator;
