//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync runs (outcome, duration, watermark advances)
//! - Package syncs performed by the worker

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Runs
// =============================================================================

/// Sync runs total by outcome.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mirror_sync_runs_total", "Total sync runs"),
        &["outcome"], // "success", "partial", "noop", "failed"
    )
    .unwrap()
});

/// Sync run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mirror_sync_run_duration_seconds",
            "Duration of a sync run from planning to finalization",
        )
        .buckets(vec![
            1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 14400.0, 86400.0,
        ]),
        &["outcome"],
    )
    .unwrap()
});

/// Watermark advances.
pub static WATERMARK_ADVANCES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mirror_sync_watermark_advances_total",
        "Number of times the sync watermark moved forward",
    )
    .unwrap()
});

// =============================================================================
// Packages
// =============================================================================

/// Package syncs by result.
pub static PACKAGES_SYNCED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mirror_sync_packages_total", "Total package sync attempts"),
        &["result"], // "success", "removed", "failed"
    )
    .unwrap()
});

/// All core metrics, for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SYNC_RUNS.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(WATERMARK_ADVANCES.clone()),
        Box::new(PACKAGES_SYNCED.clone()),
    ]
}
