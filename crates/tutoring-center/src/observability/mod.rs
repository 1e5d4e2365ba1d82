//! Observability for the tutoring center.
//!
//! Narration goes through `tracing` (targets `tutoring.actor.*` and
//! `tutoring.simulation`), filtered by [`logging::env_filter`]. Counters and
//! gauges go through the `metrics` facade.
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `tutoring_seats_acquired_total` | Counter | none | Chairs taken |
//! | `tutoring_seat_rejections_total` | Counter | none | Students turned away |
//! | `tutoring_sessions_total` | Counter | none | Sessions completed |
//! | `tutoring_chairs_available` | Gauge | none | Free chairs |
//! | `tutoring_tutored_now` | Gauge | none | Sessions in progress |
//! | `tutoring_dispatch_queue_depth` | Gauge | none | Admitted students awaiting a tutor |
//! | `tutoring_help_wait_seconds` | Histogram | none | Chair-to-help latency |
//! | `tutoring_actor_failures_total` | Counter | `actor_type` | Actors that stopped on error |

pub mod logging;
pub mod metrics;

pub use logging::{env_filter, DEFAULT_LOG_FILTER};
pub use metrics::{
    record_actor_failure, record_help_wait, record_seat_acquired, record_seat_rejected,
    record_session_completed, set_chairs_available, set_dispatch_queue_depth, set_tutored_now,
};
