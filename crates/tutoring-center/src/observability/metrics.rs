//! Metrics facade definitions for the tutoring center.
//!
//! All metrics follow Prometheus naming conventions:
//! - `tutoring_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! No exporter is installed by the binary. Without a recorder every call here
//! is a no-op; embedders and tests install their own.
//!
//! # Cardinality
//!
//! The only label is `actor_type`, bounded to 3 values (student, coordinator,
//! tutor). Student and tutor identities are never used as labels.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Metric: `tutoring_seats_acquired_total`
pub fn record_seat_acquired() {
    counter!("tutoring_seats_acquired_total").increment(1);
}

/// Metric: `tutoring_seat_rejections_total`
///
/// Incremented each time a student finds every chair taken.
pub fn record_seat_rejected() {
    counter!("tutoring_seat_rejections_total").increment(1);
}

/// Metric: `tutoring_sessions_total`
pub fn record_session_completed() {
    counter!("tutoring_sessions_total").increment(1);
}

/// Metric: `tutoring_chairs_available`
pub fn set_chairs_available(count: u32) {
    gauge!("tutoring_chairs_available").set(f64::from(count));
}

/// Metric: `tutoring_tutored_now`
pub fn set_tutored_now(count: u32) {
    gauge!("tutoring_tutored_now").set(f64::from(count));
}

/// Metric: `tutoring_dispatch_queue_depth`
pub fn set_dispatch_queue_depth(depth: usize) {
    // usize to f64 conversion is safe: depth is bounded by the chair count
    #[allow(clippy::cast_precision_loss)]
    gauge!("tutoring_dispatch_queue_depth").set(depth as f64);
}

/// Metric: `tutoring_help_wait_seconds`
///
/// Time from taking a chair to receiving the completion notice.
pub fn record_help_wait(wait: Duration) {
    histogram!("tutoring_help_wait_seconds").record(wait.as_secs_f64());
}

/// Metric: `tutoring_actor_failures_total`
/// Labels: `actor_type`
pub fn record_actor_failure(actor_type: &str) {
    let actor_type = actor_type.to_string();
    counter!("tutoring_actor_failures_total", "actor_type" => actor_type).increment(1);
}
