// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the search core.
//!
//! # Example
//!
//! ```
//! use criteria_search::{CompilerConfig, SearchConfig};
//!
//! // Minimal config (uses defaults)
//! let config = SearchConfig::default();
//! assert_eq!(config.compiler.facet_agg_suffix, "_agg");
//!
//! // Full config
//! let config = SearchConfig {
//!     elastic_url: Some("http://localhost:9200".into()),
//!     request_timeout_ms: 2_000,
//!     compiler: CompilerConfig {
//!         free_text_fields: vec!["title".into(), "description".into()],
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Settings the compiler, assembler and extractor read.
///
/// Passed explicitly into every call; nothing in the core reads global state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompilerConfig {
    /// Fields searched by the free-text `searchString` clause
    #[serde(default = "default_free_text_fields")]
    pub free_text_fields: Vec<String>,

    /// Field targeted by a bare top-level `must_not` value
    #[serde(default = "default_exclusion_field")]
    pub exclusion_field: String,

    /// Suffix appended to a facet field to name its aggregation
    #[serde(default = "default_facet_agg_suffix")]
    pub facet_agg_suffix: String,

    /// Bucket count per facet aggregation (None = backend default)
    #[serde(default)]
    pub facet_size: Option<u32>,
}

fn default_free_text_fields() -> Vec<String> { vec!["*".to_string()] }
fn default_exclusion_field() -> String { "status".to_string() }
fn default_facet_agg_suffix() -> String { "_agg".to_string() }

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            free_text_fields: default_free_text_fields(),
            exclusion_field: default_exclusion_field(),
            facet_agg_suffix: default_facet_agg_suffix(),
            facet_size: None,
        }
    }
}

impl CompilerConfig {
    /// Aggregation name for a facet field: `field + suffix`.
    pub fn facet_agg_name(&self, field: &str) -> String {
        format!("{}{}", field, self.facet_agg_suffix)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchConfig {
    /// Elasticsearch base URL (e.g., "http://localhost:9200")
    #[serde(default)]
    pub elastic_url: Option<String>,

    /// Per-request timeout for the HTTP backend in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Index used when the caller does not name one
    #[serde(default = "default_index")]
    pub default_index: String,

    #[serde(default)]
    pub compiler: CompilerConfig,
}

fn default_request_timeout_ms() -> u64 { 10_000 }
fn default_index() -> String { "community_entity".to_string() }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            elastic_url: None,
            request_timeout_ms: default_request_timeout_ms(),
            default_index: default_index(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Parse a JSON config document; missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.elastic_url, None);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.compiler.free_text_fields, vec!["*".to_string()]);
        assert_eq!(config.compiler.exclusion_field, "status");
        assert_eq!(config.compiler.facet_size, None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SearchConfig::from_json(
            r#"{"elastic_url": "http://es:9200", "compiler": {"facet_size": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.elastic_url.as_deref(), Some("http://es:9200"));
        assert_eq!(config.compiler.facet_size, Some(50));
        assert_eq!(config.compiler.facet_agg_suffix, "_agg");
        assert_eq!(config.default_index, "community_entity");
    }

    #[test]
    fn test_facet_agg_name() {
        let config = CompilerConfig::default();
        assert_eq!(config.facet_agg_name("communityId"), "communityId_agg");
    }
}
