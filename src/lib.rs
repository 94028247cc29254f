//! # Criteria Search
//!
//! Compiles loosely-typed search criteria into a structured boolean query,
//! runs it against a pluggable search backend, and extracts a typed, faceted
//! result.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SearchCriteria                         │
//! │  • filterCriteriaMap, searchString, facets                  │
//! │  • pageNumber / pageSize, requestedFields, sortBy           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               QueryCompiler + RequestAssembler              │
//! │  • Pure: no I/O, no shared state                            │
//! │  • Malformed criteria rejected before any backend call      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SearchBackend                         │
//! │  • ElasticBackend (HTTP), InMemoryBackend (tests/demos)     │
//! │  • RetryingBackend wrapper for transient failures           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ResultExtractor                        │
//! │  • Exact total, documents in backend order                  │
//! │  • Facet buckets minus blank keys                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use criteria_search::{SearchConfig, SearchCriteria, SearchService};
//! use criteria_search::backend::ElasticBackend;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig {
//!         elastic_url: Some("http://localhost:9200".into()),
//!         ..Default::default()
//!     };
//!     let backend = ElasticBackend::from_config(&config)?;
//!     let service = SearchService::new(backend, config);
//!
//!     if !service.index_exists("community_entity").await {
//!         println!("index not there yet");
//!         return Ok(());
//!     }
//!
//!     let criteria = SearchCriteria::new()
//!         .page(0, 20)
//!         .filter("status", json!("active"))
//!         .filter("memberCount", json!({"gte": 10}))
//!         .facet("category")
//!         .search("rust meetup");
//!
//!     let result = service.search_documents("community_entity", &criteria).await?;
//!     println!("{} matches", result.total_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`search`]: Query AST, compiler, assembler, extractor, Elasticsearch translator
//! - [`backend`]: Backend trait and implementations
//! - [`service`]: The [`SearchService`] tying the pipeline together
//! - [`criteria`]: Caller-facing request and result types
//! - [`metrics`]: `metrics` crate instrumentation

pub mod backend;
pub mod config;
pub mod criteria;
pub mod error;
pub mod metrics;
pub mod search;
pub mod service;

// Note: We don't expose a `tracing` module to avoid conflict with the tracing crate

pub use backend::{ElasticBackend, InMemoryBackend, RetryConfig, RetryingBackend, SearchBackend};
pub use config::{CompilerConfig, SearchConfig};
pub use criteria::{Document, FacetResult, FacetValue, FilterMap, SearchCriteria, SearchResult, SortBy, SortOrder};
pub use error::{BackendError, QueryError, SearchError};
pub use metrics::LatencyTimer;
pub use search::{Query, QueryCompiler, RequestAssembler, ResultExtractor, SearchRequest};
pub use service::SearchService;
