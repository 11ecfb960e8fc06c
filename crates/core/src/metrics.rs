//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Reservation runs (outcomes, durations, login retries)
//! - Per-window attempts (portal submissions)
//! - Scheduler ticks

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Reservation Run Metrics
// =============================================================================

/// Reservation runs total by outcome.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("seatgrab_runs_total", "Total reservation runs"),
        &["outcome"], // "success", "partial", "failed", "auth_failed"
    )
    .unwrap()
});

/// Run duration in seconds, login through last window result.
pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("seatgrab_run_duration_seconds", "Duration of reservation runs")
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

/// Login retries total.
pub static LOGIN_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "seatgrab_login_retries_total",
        "Total login retries with a fresh session",
    )
    .unwrap()
});

// =============================================================================
// Window Attempt Metrics
// =============================================================================

/// Window attempts total by result.
pub static WINDOW_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seatgrab_window_attempts_total",
            "Total per-window reservation attempts",
        ),
        &["result"], // "success", "rejected", "failed"
    )
    .unwrap()
});

/// Seats parsed per window fragment.
pub static SEATS_PARSED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "seatgrab_seats_parsed",
            "Number of seats parsed per window fragment",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

// =============================================================================
// Scheduler Metrics
// =============================================================================

/// Scheduler ticks total by outcome.
pub static SCHEDULER_TICKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("seatgrab_scheduler_ticks_total", "Total scheduler ticks"),
        &["outcome"], // "idle", "triggered", "skipped", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Runs
        Box::new(RUNS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(LOGIN_RETRIES.clone()),
        // Windows
        Box::new(WINDOW_ATTEMPTS.clone()),
        Box::new(SEATS_PARSED.clone()),
        // Scheduler
        Box::new(SCHEDULER_TICKS.clone()),
    ]
}
