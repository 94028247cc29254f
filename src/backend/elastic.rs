// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Elasticsearch backend over HTTP.
//!
//! ```text
//! search       POST {base}/{index}/_search   body = ElasticTranslator::request_body
//! check_index  HEAD {base}/{index}           200 → true, 404 → false
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::SearchBackend;
use crate::config::SearchConfig;
use crate::error::BackendError;
use crate::search::{ElasticTranslator, RawResponse, SearchRequest};

pub struct ElasticBackend {
    client: Client,
    base_url: String,
}

impl ElasticBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Connection(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build from config; fails when no `elastic_url` is set.
    pub fn from_config(config: &SearchConfig) -> Result<Self, BackendError> {
        let url = config
            .elastic_url
            .as_deref()
            .ok_or_else(|| BackendError::Unavailable("no elastic_url configured".into()))?;
        Self::new(url, Duration::from_millis(config.request_timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{}", self.base_url, index)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else if err.is_decode() || err.is_body() {
        BackendError::Protocol(err.to_string())
    } else {
        BackendError::Connection(err.to_string())
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    fn name(&self) -> &'static str {
        "elastic"
    }

    async fn search(&self, request: &SearchRequest) -> Result<RawResponse, BackendError> {
        let url = format!("{}/_search", self.index_url(&request.index));
        let body = ElasticTranslator::request_body(request);
        debug!(%url, %body, "Sending search request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status: status.as_u16(), body });
        }

        let payload: Value = response.json().await.map_err(map_reqwest_error)?;
        RawResponse::from_elastic(&payload)
    }

    async fn check_index(&self, index: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .head(self.index_url(index))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(BackendError::Status {
                status: other.as_u16(),
                body: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = ElasticBackend::new("http://localhost:9200/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:9200");
        assert_eq!(backend.index_url("posts"), "http://localhost:9200/posts");
    }

    #[test]
    fn test_from_config_requires_url() {
        let err = ElasticBackend::from_config(&SearchConfig::default()).err().unwrap();
        assert!(matches!(err, BackendError::Unavailable(_)));

        let config = SearchConfig {
            elastic_url: Some("http://es:9200".into()),
            ..Default::default()
        };
        assert_eq!(ElasticBackend::from_config(&config).unwrap().base_url(), "http://es:9200");
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_transient_error() {
        // Port 1 is never an Elasticsearch node
        let backend = ElasticBackend::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = backend.check_index("posts").await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }
}
