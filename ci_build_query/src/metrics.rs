//! Prometheus metrics for build query observability.

use metrics::{counter, histogram};

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a finished query execution.
pub fn query_executed(outcome: &str) {
    counter!("ci_build_queries_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record query wall time.
pub fn query_duration(duration_ms: u64) {
    histogram!("ci_build_query_duration_ms").record(duration_ms as f64);
}

/// Record builds dropped because their buildable was not visible.
pub fn builds_hidden(count: usize) {
    if count > 0 {
        counter!("ci_build_query_hidden_total").increment(count as u64);
    }
}

/// Record targets dropped for belonging to a superseded generation.
pub fn stale_targets_dropped(count: usize) {
    if count > 0 {
        counter!("ci_build_query_stale_targets_total").increment(count as u64);
    }
}

/// Record how many builds a page returned.
pub fn page_returned(size: usize) {
    histogram!("ci_build_query_page_size").record(size as f64);
}
