//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the mirror sync server:
//! - HTTP request metrics (latency, counts)
//! - Current sync run progress (collected dynamically)
//! - Core sync metrics registered from `mirror_sync_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mirror_sync_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mirror_sync_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mirror_sync_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Sync Run Metrics (collected dynamically)
// =============================================================================

/// Whether a sync run is active (1) or not (0).
pub static SYNC_RUN_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mirror_sync_run_active",
        "Whether a sync run is currently in progress",
    )
    .unwrap()
});

/// Progress of the most recent run.
pub static SYNC_RUN_PACKAGES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "mirror_sync_run_packages",
            "Package counts of the most recent sync run",
        ),
        &["kind"], // "need", "successes", "fails"
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Sync runs
    registry
        .register(Box::new(SYNC_RUN_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(SYNC_RUN_PACKAGES.clone()))
        .unwrap();

    // Core metrics (runs, packages, watermark)
    for metric in mirror_sync_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the current run.
pub fn collect_dynamic_metrics(state: &AppState) {
    SYNC_RUN_ACTIVE.set(i64::from(state.scheduler().is_busy()));

    if let Some(snapshot) = state.status_board().snapshot() {
        SYNC_RUN_PACKAGES
            .with_label_values(&["need"])
            .set(snapshot.need as i64);
        SYNC_RUN_PACKAGES
            .with_label_values(&["successes"])
            .set(snapshot.progress.successes as i64);
        SYNC_RUN_PACKAGES
            .with_label_values(&["fails"])
            .set(snapshot.progress.fails as i64);
    }
}
