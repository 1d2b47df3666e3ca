//! Prometheus metrics recording.

use axum::http::StatusCode;
use metrics::{counter, gauge, histogram};
use scopematch_core::storage::{IngestStats, VectorStore};
use std::time::Duration;

/// Records one HTTP request, labelled by route template so query strings and
/// ids never become label values.
pub fn record_request(method: &str, route: &str, status: StatusCode, duration: Duration) {
    let class = match status.as_u16() {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", class.to_string()),
    ];
    counter!("scopematch_http_requests_total", &labels).increment(1);
    histogram!("scopematch_http_request_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

/// Records one completed analysis and how it was scored (`semantic` or `lexical`).
pub fn record_analysis(mode: &str, duration: Duration) {
    counter!("scopematch_analyses_total", "mode" => mode.to_string()).increment(1);
    histogram!("scopematch_analysis_duration_seconds", "mode" => mode.to_string())
        .record(duration.as_secs_f64());
}

/// Records a query whose embedding could not be obtained.
pub fn record_embedding_failure(reason: &str) {
    counter!("scopematch_embedding_failures_total", "reason" => reason.to_string()).increment(1);
}

/// Updates corpus gauges and ingestion counters after a successful load.
pub fn record_corpus_load(store: &VectorStore, stats: &IngestStats, duration: Duration) {
    gauge!("scopematch_corpus_entries").set(store.len() as f64);
    gauge!("scopematch_corpus_semantic_entries").set(store.semantic_count() as f64);
    gauge!("scopematch_corpus_capacity").set(store.capacity() as f64);
    gauge!("scopematch_corpus_memory_bytes").set(store.estimate_memory_bytes() as f64);
    counter!("scopematch_ingest_records_total", "outcome" => "admitted")
        .increment(stats.admitted as u64);
    counter!("scopematch_ingest_records_total", "outcome" => "malformed")
        .increment(stats.malformed as u64);
    counter!("scopematch_ingest_records_total", "outcome" => "duplicate")
        .increment(stats.duplicates as u64);
    counter!("scopematch_ingest_records_total", "outcome" => "dropped")
        .increment(stats.dropped_over_capacity as u64);
    histogram!("scopematch_corpus_load_duration_seconds").record(duration.as_secs_f64());
}

/// Records a failed corpus load.
pub fn record_corpus_load_failure() {
    counter!("scopematch_corpus_load_failures_total").increment(1);
}
