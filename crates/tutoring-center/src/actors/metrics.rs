//! Lock-free counters shared by every actor.
//!
//! These back the end-of-run report and the acquire/release pairing check.
//! Each recording method also forwards to the `metrics` facade in
//! [`crate::observability::metrics`].

use crate::observability::metrics as facade;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Actor kind, used for log targets and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorType {
    /// One per student.
    Student,
    /// Singleton broker between the two queues.
    Coordinator,
    /// One per tutor.
    Tutor,
}

impl ActorType {
    /// Returns the actor type as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActorType::Student => "student",
            ActorType::Coordinator => "coordinator",
            ActorType::Tutor => "tutor",
        }
    }
}

/// Aggregated counters for one simulation run.
#[derive(Debug, Default)]
pub struct CenterMetrics {
    seats_acquired: AtomicU64,
    seats_released: AtomicU64,
    seat_rejections: AtomicU64,
    admissions: AtomicU64,
    dispatches: AtomicU64,
    sessions_completed: AtomicU64,
    /// Highest number of chairs held at once.
    peak_occupied: AtomicU32,
    actor_failures: AtomicU64,
}

/// Point-in-time copy of [`CenterMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterMetricsSnapshot {
    pub seats_acquired: u64,
    pub seats_released: u64,
    pub seat_rejections: u64,
    pub admissions: u64,
    pub dispatches: u64,
    pub sessions_completed: u64,
    pub peak_occupied: u32,
    pub actor_failures: u64,
}

impl CenterMetrics {
    /// Create a new shared metrics instance.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A student took a chair; `occupied` is the count after taking it.
    pub fn record_seat_acquired(&self, occupied: u32, chairs_available: u32) {
        self.seats_acquired.fetch_add(1, Ordering::SeqCst);

        let mut current_peak = self.peak_occupied.load(Ordering::Relaxed);
        while occupied > current_peak {
            match self.peak_occupied.compare_exchange_weak(
                current_peak,
                occupied,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current_peak = actual,
            }
        }

        facade::record_seat_acquired();
        facade::set_chairs_available(chairs_available);
    }

    /// A student gave a chair back.
    pub fn record_seat_released(&self, chairs_available: u32) {
        self.seats_released.fetch_add(1, Ordering::SeqCst);
        facade::set_chairs_available(chairs_available);
    }

    /// A student found no free chair.
    pub fn record_seat_rejected(&self) {
        self.seat_rejections.fetch_add(1, Ordering::Relaxed);
        facade::record_seat_rejected();
    }

    /// The coordinator took a student off the admission queue.
    pub fn record_admission(&self) {
        self.admissions.fetch_add(1, Ordering::Relaxed);
    }

    /// The coordinator placed a student on the dispatch queue.
    pub fn record_dispatch(&self, queue_depth: usize) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        facade::set_dispatch_queue_depth(queue_depth);
    }

    /// A tutor started a session.
    pub fn record_tutoring_started(&self, tutored_now: u32) {
        facade::set_tutored_now(tutored_now);
    }

    /// A tutor finished a session.
    pub fn record_session_completed(&self, tutored_now: u32) {
        self.sessions_completed.fetch_add(1, Ordering::SeqCst);
        facade::record_session_completed();
        facade::set_tutored_now(tutored_now);
    }

    /// A student waited `wait` between sitting down and being helped.
    pub fn record_help_wait(&self, wait: Duration) {
        facade::record_help_wait(wait);
    }

    /// An actor stopped with an error or panic.
    pub fn record_actor_failure(&self, actor_type: ActorType) {
        self.actor_failures.fetch_add(1, Ordering::Relaxed);
        facade::record_actor_failure(actor_type.as_str());
    }

    #[must_use]
    pub fn seats_acquired(&self) -> u64 {
        self.seats_acquired.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn seats_released(&self) -> u64 {
        self.seats_released.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn peak_occupied(&self) -> u32 {
        self.peak_occupied.load(Ordering::Relaxed)
    }

    /// Take a snapshot of every counter.
    #[must_use]
    pub fn snapshot(&self) -> CenterMetricsSnapshot {
        CenterMetricsSnapshot {
            seats_acquired: self.seats_acquired.load(Ordering::SeqCst),
            seats_released: self.seats_released.load(Ordering::SeqCst),
            seat_rejections: self.seat_rejections.load(Ordering::Relaxed),
            admissions: self.admissions.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            sessions_completed: self.sessions_completed.load(Ordering::SeqCst),
            peak_occupied: self.peak_occupied.load(Ordering::Relaxed),
            actor_failures: self.actor_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_type_labels() {
        assert_eq!(ActorType::Student.as_str(), "student");
        assert_eq!(ActorType::Coordinator.as_str(), "coordinator");
        assert_eq!(ActorType::Tutor.as_str(), "tutor");
    }

    #[test]
    fn test_peak_occupied_tracks_maximum() {
        let metrics = CenterMetrics::new();

        metrics.record_seat_acquired(1, 2);
        metrics.record_seat_acquired(2, 1);
        metrics.record_seat_released(2);
        metrics.record_seat_acquired(1, 2);

        assert_eq!(metrics.peak_occupied(), 2);
        assert_eq!(metrics.seats_acquired(), 3);
        assert_eq!(metrics.seats_released(), 1);
    }

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = CenterMetrics::new();

        metrics.record_seat_rejected();
        metrics.record_seat_rejected();
        metrics.record_admission();
        metrics.record_dispatch(1);
        metrics.record_tutoring_started(1);
        metrics.record_session_completed(0);
        metrics.record_actor_failure(ActorType::Tutor);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.seat_rejections, 2);
        assert_eq!(snapshot.admissions, 1);
        assert_eq!(snapshot.dispatches, 1);
        assert_eq!(snapshot.sessions_completed, 1);
        assert_eq!(snapshot.actor_failures, 1);
        assert_eq!(snapshot.peak_occupied, 0);
    }

    #[test]
    fn test_concurrent_peak_updates() {
        let metrics = CenterMetrics::new();

        let handles: Vec<_> = (1..=8u32)
            .map(|occupied| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || metrics.record_seat_acquired(occupied, 0))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.peak_occupied(), 8);
        assert_eq!(metrics.seats_acquired(), 8);
    }
}
