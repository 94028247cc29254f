// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search backends.
//!
//! A backend executes an assembled [`SearchRequest`] and answers index
//! presence probes. Errors are reported as-is; deciding what to do with them
//! is the caller's job.
//!
//! - [`ElasticBackend`]: Elasticsearch over HTTP
//! - [`InMemoryBackend`]: DashMap-backed evaluator for tests and demos
//! - [`RetryingBackend`]: wraps any backend with retry on transient errors

mod elastic;
mod memory;
mod retry;

pub use elastic::ElasticBackend;
pub use memory::InMemoryBackend;
pub use retry::{retry, RetryConfig, RetryingBackend};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::BackendError;
use crate::search::{RawResponse, SearchRequest};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short label for logs and metrics.
    fn name(&self) -> &'static str;

    async fn search(&self, request: &SearchRequest) -> Result<RawResponse, BackendError>;

    /// `Ok(false)` means the backend answered and the index is absent.
    async fn check_index(&self, index: &str) -> Result<bool, BackendError>;
}

#[async_trait]
impl<B: SearchBackend + ?Sized> SearchBackend for Arc<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn search(&self, request: &SearchRequest) -> Result<RawResponse, BackendError> {
        (**self).search(request).await
    }

    async fn check_index(&self, index: &str) -> Result<bool, BackendError> {
        (**self).check_index(index).await
    }
}
