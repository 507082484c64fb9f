//! Prometheus metrics for Pair Sentinel
//!
//! Exposes metrics endpoint for monitoring:
//! - Evaluations by outcome
//! - Rule failures by rule
//! - Source fetch failures and latency
//! - Watchlist size gauge

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::models::{DataSource, Verdict};

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Completed evaluations (outcome = admitted | rejected | blacklisted)
    pub evaluations: IntCounterVec,
    /// Failed rules (rule = rule id)
    pub rule_failures: IntCounterVec,
    /// Failed source fetches (source, kind)
    pub fetch_failures: IntCounterVec,
    /// Source fetch latency in milliseconds (source)
    pub fetch_latency: HistogramVec,
    /// Addresses on the watchlist
    pub watchlist_size: IntGauge,
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let evaluations = IntCounterVec::new(
            Opts::new(
                "sentinel_evaluations_total",
                "Completed safety evaluations by outcome",
            ),
            &["outcome"],
        )
        .expect("Failed to create evaluations counter");
        registry
            .register(Box::new(evaluations.clone()))
            .expect("Failed to register evaluations");

        let rule_failures = IntCounterVec::new(
            Opts::new(
                "sentinel_rule_failures_total",
                "Admission rule failures by rule identifier",
            ),
            &["rule"],
        )
        .expect("Failed to create rule_failures counter");
        registry
            .register(Box::new(rule_failures.clone()))
            .expect("Failed to register rule_failures");

        let fetch_failures = IntCounterVec::new(
            Opts::new(
                "sentinel_fetch_failures_total",
                "Failed data source fetches by source and failure kind",
            ),
            &["source", "kind"],
        )
        .expect("Failed to create fetch_failures counter");
        registry
            .register(Box::new(fetch_failures.clone()))
            .expect("Failed to register fetch_failures");

        let fetch_latency = HistogramVec::new(
            HistogramOpts::new(
                "sentinel_fetch_latency_ms",
                "Data source fetch latency in milliseconds",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
            ]),
            &["source"],
        )
        .expect("Failed to create fetch_latency histogram");
        registry
            .register(Box::new(fetch_latency.clone()))
            .expect("Failed to register fetch_latency");

        let watchlist_size = IntGauge::with_opts(Opts::new(
            "sentinel_watchlist_size",
            "Number of addresses on the watchlist",
        ))
        .expect("Failed to create watchlist_size gauge");
        registry
            .register(Box::new(watchlist_size.clone()))
            .expect("Failed to register watchlist_size");

        Self {
            registry,
            evaluations,
            rule_failures,
            fetch_failures,
            fetch_latency,
            watchlist_size,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Count a finished evaluation and its failed rules
    pub fn record_verdict(&self, verdict: &Verdict) {
        let outcome = if verdict.admitted {
            "admitted"
        } else if verdict.is_blacklisted() {
            "blacklisted"
        } else {
            "rejected"
        };
        self.evaluations.with_label_values(&[outcome]).inc();

        for rule in &verdict.failed_rules {
            self.rule_failures.with_label_values(&[rule.id()]).inc();
        }
    }

    pub fn record_fetch(&self, source: DataSource, elapsed_ms: f64, failure: Option<&str>) {
        self.fetch_latency
            .with_label_values(&[source.as_str()])
            .observe(elapsed_ms);
        if let Some(kind) = failure {
            self.fetch_failures
                .with_label_values(&[source.as_str(), kind])
                .inc();
        }
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("Content-Type", "text/plain; version=0.0.4")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        buffer,
    )
}

/// Create metrics router
pub fn metrics_router() -> Router<Arc<MetricsState>> {
    Router::new().route("/metrics", get(metrics_handler))
}
