// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search service
//!
//! Runs one criteria search end to end against a [`SearchBackend`].
//!
//! # Architecture
//!
//! ```text
//! search_documents(index, criteria)
//!       │
//!       ├─→ QueryCompiler::compile_criteria
//!       │        │
//!       │        └─→ Err? Return before any backend call
//!       │
//!       ├─→ RequestAssembler::assemble
//!       │
//!       ├─→ backend.search(request)
//!       │        │
//!       │        └─→ Err? Propagate untouched
//!       │
//!       └─→ ResultExtractor::extract → SearchResult
//!
//! index_exists(name)
//!       │
//!       └─→ backend.check_index(name), any error → false
//! ```

use tracing::{debug, info, warn};

use crate::backend::SearchBackend;
use crate::config::SearchConfig;
use crate::criteria::{SearchCriteria, SearchResult};
use crate::error::{QueryError, SearchError};
use crate::metrics::{self, LatencyTimer};
use crate::search::{QueryCompiler, RequestAssembler, ResultExtractor, SearchRequest};

pub struct SearchService<B> {
    backend: B,
    config: SearchConfig,
}

impl<B: SearchBackend> SearchService<B> {
    pub fn new(backend: B, config: SearchConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compile and assemble without calling the backend.
    pub fn prepare(&self, index: &str, criteria: &SearchCriteria) -> Result<SearchRequest, QueryError> {
        let compiler_config = &self.config.compiler;
        let query = QueryCompiler::compile_criteria(criteria, compiler_config).map_err(|e| {
            metrics::record_compile_error(e.kind());
            e
        })?;
        metrics::record_compile_success();
        Ok(RequestAssembler::assemble(index, query, criteria, compiler_config))
    }

    /// Search `index` with the caller's criteria.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use criteria_search::{SearchService, SearchConfig, SearchCriteria, backend::InMemoryBackend};
    /// # use serde_json::json;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let backend = InMemoryBackend::new();
    /// backend.insert("posts", "1", json!({"status": "active", "category": "tech"}));
    ///
    /// let service = SearchService::new(backend, SearchConfig::default());
    /// let criteria = SearchCriteria::new()
    ///     .page(0, 20)
    ///     .filter("status", json!("active"))
    ///     .facet("category");
    ///
    /// let result = service.search_documents("posts", &criteria).await?;
    /// assert_eq!(result.total_count, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_documents(
        &self,
        index: &str,
        criteria: &SearchCriteria,
    ) -> Result<SearchResult, SearchError> {
        let request = match self.prepare(index, criteria) {
            Ok(request) => request,
            Err(e) => {
                warn!(index, error = %e, "Rejected search criteria");
                return Err(e.into());
            }
        };
        debug!(index, query = ?request.query, from = ?request.from, size = ?request.size, "Compiled search request");

        let backend = self.backend.name();
        let raw = {
            let _timer = LatencyTimer::new(backend, "search");
            self.backend.search(&request).await
        };
        let raw = match raw {
            Ok(raw) => {
                metrics::record_search_query(backend, "success");
                raw
            }
            Err(e) => {
                metrics::record_search_query(backend, "error");
                warn!(index, backend, error = %e, "Search backend call failed");
                return Err(e.into());
            }
        };

        let result = ResultExtractor::extract(raw, criteria, &self.config.compiler);
        metrics::record_search_results(result.total_count);
        metrics::record_facet_buckets(result.facets.values().map(Vec::len).sum());
        info!(
            index,
            total = result.total_count,
            returned = result.data.len(),
            facets = result.facets.len(),
            "Search completed"
        );
        Ok(result)
    }

    /// Search the configured default index.
    pub async fn search_default(&self, criteria: &SearchCriteria) -> Result<SearchResult, SearchError> {
        self.search_documents(&self.config.default_index, criteria).await
    }

    /// Best-effort presence probe: any backend failure reads as `false`.
    pub async fn index_exists(&self, name: &str) -> bool {
        let result = {
            let _timer = LatencyTimer::new(self.backend.name(), "check_index");
            self.backend.check_index(name).await
        };
        match result {
            Ok(true) => {
                metrics::record_index_probe("present");
                true
            }
            Ok(false) => {
                metrics::record_index_probe("absent");
                false
            }
            Err(e) => {
                metrics::record_index_probe("error");
                warn!(index = name, error = %e, "Index presence check failed, reporting absent");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::BackendError;
    use serde_json::json;

    fn service() -> SearchService<InMemoryBackend> {
        let backend = InMemoryBackend::new();
        backend.index_documents(
            "posts",
            vec![
                ("1", json!({"title": "one", "status": "active", "category": "tech"})),
                ("2", json!({"title": "two", "status": "active", "category": ""})),
                ("3", json!({"title": "three", "status": "archived", "category": "tech"})),
            ],
        );
        SearchService::new(backend, SearchConfig::default())
    }

    #[tokio::test]
    async fn test_search_documents() {
        let criteria = SearchCriteria::new()
            .filter("status", json!("active"))
            .facet("category");
        let result = service().search_documents("posts", &criteria).await.unwrap();

        assert_eq!(result.total_count, 2);
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.facets["category"].len(), 1);
        assert_eq!(result.facets["category"][0].value, "tech");
    }

    #[tokio::test]
    async fn test_compile_error_never_reaches_backend() {
        let svc = service();
        svc.backend().set_available(false);
        let criteria = SearchCriteria::new().filter("age", json!({"gte": 1, "between": 5}));

        let err = svc.search_documents("posts", &criteria).await.unwrap_err();
        assert!(matches!(err, SearchError::Query(QueryError::UnsupportedRangeOperator { .. })));
    }

    #[tokio::test]
    async fn test_backend_error_propagated() {
        let svc = service();
        svc.backend().set_available(false);
        let err = svc.search_documents("posts", &SearchCriteria::new()).await.unwrap_err();
        assert!(matches!(err, SearchError::Backend(BackendError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_index_exists_swallows_errors() {
        let svc = service();
        assert!(svc.index_exists("posts").await);
        assert!(!svc.index_exists("missing").await);

        svc.backend().set_available(false);
        assert!(!svc.index_exists("posts").await);
    }

    #[tokio::test]
    async fn test_search_default_uses_configured_index() {
        let backend = InMemoryBackend::new();
        backend.insert("community_entity", "c1", json!({"name": "rustaceans"}));
        let svc = SearchService::new(backend, SearchConfig::default());

        let result = svc.search_default(&SearchCriteria::new()).await.unwrap();
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_prepare_builds_request_without_io() {
        let request = service()
            .prepare("posts", &SearchCriteria::new().page(2, 5).fields(["title"]))
            .unwrap();
        assert_eq!(request.index, "posts");
        assert_eq!(request.from, Some(10));
        assert_eq!(request.source_includes, Some(vec!["title".to_string()]));
    }
}
