// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for criteria-search.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding service is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `criteria_search_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `backend`: elastic, memory
//! - `operation`: search, check_index
//! - `status`: success, error, rejected

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

// ═══════════════════════════════════════════════════════════════════════════
// COMPILE - Criteria to query
// ═══════════════════════════════════════════════════════════════════════════

/// Record a successful criteria compile
pub fn record_compile_success() {
    counter!(
        "criteria_search_compiles_total",
        "status" => "success"
    )
    .increment(1);
}

/// Record a rejected criteria, labelled with the error kind
pub fn record_compile_error(kind: &'static str) {
    counter!(
        "criteria_search_compiles_total",
        "status" => "rejected",
        "error_type" => kind
    )
    .increment(1);
}

// ═══════════════════════════════════════════════════════════════════════════
// SEARCH - Backend round trips
// ═══════════════════════════════════════════════════════════════════════════

/// Record a search query execution
pub fn record_search_query(backend: &str, status: &str) {
    counter!(
        "criteria_search_queries_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record backend call latency
pub fn record_backend_latency(backend: &str, operation: &str, duration: Duration) {
    histogram!(
        "criteria_search_backend_seconds",
        "backend" => backend.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record total matches reported by the backend
pub fn record_search_results(total: u64) {
    histogram!("criteria_search_results").record(total as f64);
}

/// Record how many facet buckets were returned for one search
pub fn record_facet_buckets(count: usize) {
    histogram!("criteria_search_facet_buckets").record(count as f64);
}

/// Record a backend retry
pub fn record_retry(operation: &str) {
    counter!(
        "criteria_search_retries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

// ═══════════════════════════════════════════════════════════════════════════
// INDEX - Presence probes
// ═══════════════════════════════════════════════════════════════════════════

/// Record an index presence probe (present, absent, error)
pub fn record_index_probe(outcome: &'static str) {
    counter!(
        "criteria_search_index_probes_total",
        "outcome" => outcome
    )
    .increment(1);
}

/// A timing guard that records backend latency on drop
pub struct LatencyTimer {
    backend: &'static str,
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(backend: &'static str, operation: &'static str) -> Self {
        Self {
            backend,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_backend_latency(self.backend, self.operation, self.start.elapsed());
    }
}
