// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic criteria-search usage example.
//!
//! Demonstrates:
//! 1. Seeding the in-memory backend with a few community documents
//! 2. Probing index presence
//! 3. Filtered, paginated search with facets
//! 4. Free-text search across configured fields
//! 5. A rejected criteria (never reaches the backend)
//! 6. Displaying metrics (OTEL-compatible)
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```
//!
//! Point `ELASTIC_URL` at a cluster to run the same searches against
//! Elasticsearch instead.

use criteria_search::backend::{ElasticBackend, InMemoryBackend, SearchBackend};
use criteria_search::{CompilerConfig, SearchConfig, SearchCriteria, SearchService, SortOrder};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::json;

const INDEX: &str = "community_entity";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install metrics recorder (captures all metrics for OTEL export)
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "criteria_search=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║          criteria-search: Basic Usage Example                 ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let config = SearchConfig {
        elastic_url: std::env::var("ELASTIC_URL").ok(),
        compiler: CompilerConfig {
            free_text_fields: vec!["name".into(), "description".into()],
            facet_size: Some(20),
            ..Default::default()
        },
        ..Default::default()
    };

    match config.elastic_url.clone() {
        Some(url) => {
            println!("🔌 Using Elasticsearch at {}", url);
            let backend = ElasticBackend::from_config(&config)?;
            run(SearchService::new(backend, config)).await
        }
        None => {
            println!("📦 Using in-memory backend (set ELASTIC_URL for a real cluster)");
            let backend = InMemoryBackend::new();
            backend.index_documents(
                INDEX,
                vec![
                    ("c1", json!({"name": "Rust Berlin", "description": "Monthly Rust meetup", "status": "active", "category": "tech", "members": 120})),
                    ("c2", json!({"name": "Pasta Lovers", "description": "Fresh pasta every week", "status": "active", "category": "food", "members": 45})),
                    ("c3", json!({"name": "Async Rust", "description": "Tokio and friends", "status": "active", "category": "tech", "members": 300})),
                    ("c4", json!({"name": "Old Forum", "description": "Read only", "status": "archived", "category": "tech", "members": 5})),
                    ("c5", json!({"name": "Board Games", "description": "Strategy nights", "status": "active", "category": "games", "members": 80})),
                ],
            );
            println!("   └─ Seeded {} documents into '{}'", backend.len(INDEX), INDEX);
            run(SearchService::new(backend, config)).await
        }
    }?;

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Dump raw metrics (OTEL-compatible)
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Raw Metrics (OTEL export format):");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Example complete!                          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

async fn run<B: SearchBackend>(service: SearchService<B>) -> Result<(), Box<dyn std::error::Error>> {
    // ─────────────────────────────────────────────────────────────────────────
    // 2. Index presence (never errors)
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔍 Checking indices...");
    for index in [INDEX, "does_not_exist"] {
        println!("   └─ {}: {}", index, service.index_exists(index).await);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Filtered, paginated search with facets
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Active communities with 50+ members, page 0 size 2, faceted by category...");
    let criteria: SearchCriteria = serde_json::from_value(json!({
        "pageNumber": 0,
        "pageSize": 2,
        "requestedFields": ["name", "members"],
        "filterCriteriaMap": {
            "status": "active",
            "members": {"gte": 50}
        },
        "facets": ["category"],
        "sortBy": {"field": "members", "order": "desc"}
    }))?;

    let result = service.search_documents(INDEX, &criteria).await?;
    println!("   Total matches: {} (showing {})", result.total_count, result.data.len());
    for doc in &result.data {
        println!("   └─ {}", serde_json::Value::Object(doc.clone()));
    }
    for (field, values) in &result.facets {
        println!("   📊 {}:", field);
        for value in values {
            println!("      └─ {} ({})", value.value, value.count);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Free text
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔎 Free text 'rust' across name/description...");
    let criteria = SearchCriteria::new()
        .search("rust")
        .filter("must_not", json!(["archived"]))
        .sort("name", SortOrder::Asc);
    let result = service.search_documents(INDEX, &criteria).await?;
    for doc in &result.data {
        println!("   └─ {}", doc.get("name").and_then(|v| v.as_str()).unwrap_or("?"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Rejected criteria
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🚫 Unsupported range operator...");
    let criteria = SearchCriteria::new().filter("members", json!({"gte": 10, "between": 20}));
    match service.search_documents(INDEX, &criteria).await {
        Ok(_) => println!("   └─ unexpectedly accepted"),
        Err(e) => println!("   └─ Rejected: {}", e),
    }

    Ok(())
}

/// Dump all captured metrics in OTEL-compatible format
fn dump_metrics(snapshotter: &Snapshotter) {
    let mut counters = vec![];
    let mut histograms = vec![];

    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };
        let name = key.name().to_string();

        match value {
            DebugValue::Counter(v) => counters.push((name, label_str, v)),
            DebugValue::Histogram(samples) => {
                let count = samples.len();
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                histograms.push((name, label_str, count, sum));
            }
            DebugValue::Gauge(_) => {}
        }
    }

    counters.sort_by(|a, b| a.0.cmp(&b.0));
    histograms.sort_by(|a, b| a.0.cmp(&b.0));

    if !counters.is_empty() {
        println!("   ┌─ Counters (cumulative)");
        for (name, labels, value) in &counters {
            println!("   │  └─ {}{} = {}", name, labels, value);
        }
    }

    if !histograms.is_empty() {
        println!("   └─ Histograms (distributions)");
        for (name, labels, count, sum) in &histograms {
            println!("   │  └─ {}{} count={} sum={:.4}", name, labels, count, sum);
        }
    }

    if counters.is_empty() && histograms.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
}
