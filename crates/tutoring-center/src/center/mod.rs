//! Shared coordination context for one simulation run.
//!
//! ```text
//! TutoringCenter
//! ├── waiting area (Mutex)   chairs + admission queue + total_requests
//! ├── tutoring area (Mutex)  dispatch queue + tutored_now + total_sessions
//! ├── admission available    Semaphore, students -> coordinator
//! ├── tutor available        Semaphore, coordinator -> tutors
//! ├── arrival clock          monotonic admission sequence
//! ├── metrics                lock-free counters
//! └── event sink             optional unbounded channel of CenterEvent
//! ```
//!
//! No actor holds both area locks at once, and no lock is held across any
//! `.await` other than acquiring it. Counting signals start at zero; every
//! queue insertion adds exactly one permit and every consumer forgets exactly
//! one permit before it dequeues.

pub mod capacity;
pub mod queues;

pub use capacity::CapacityPool;
pub use queues::{AdmissionQueue, DispatchQueue};

use crate::actors::messages::CenterEvent;
use crate::actors::metrics::CenterMetrics;
use crate::errors::TutoringError;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, MutexGuard, Semaphore};

/// State guarded by the waiting-area lock.
#[derive(Debug)]
pub struct WaitingArea {
    /// Waiting-room chairs.
    pub chairs: CapacityPool,
    /// Seated students awaiting the coordinator.
    pub admissions: AdmissionQueue,
    /// Students the coordinator has admitted so far.
    pub total_requests: u64,
}

/// State guarded by the tutoring-area lock.
#[derive(Debug, Default)]
pub struct TutoringArea {
    /// Admitted students awaiting a tutor.
    pub dispatch: DispatchQueue,
    /// Sessions currently in progress.
    pub tutored_now: u32,
    /// Sessions started so far.
    pub total_sessions: u64,
}

/// Consistent view of both areas, taken one lock at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterSnapshot {
    pub chairs_available: u32,
    pub total_chairs: u32,
    pub admission_queue_len: usize,
    pub dispatch_queue_len: usize,
    pub total_requests: u64,
    pub tutored_now: u32,
    pub total_sessions: u64,
}

/// The tutoring center shared by every actor.
#[derive(Debug)]
pub struct TutoringCenter {
    waiting_area: Mutex<WaitingArea>,
    tutoring_area: Mutex<TutoringArea>,
    admission_available: Semaphore,
    tutor_available: Semaphore,
    arrival_clock: AtomicU64,
    metrics: Arc<CenterMetrics>,
    events: Option<mpsc::UnboundedSender<CenterEvent>>,
}

impl TutoringCenter {
    /// Create a center with `chairs` free chairs and empty queues.
    #[must_use]
    pub fn new(chairs: u32, metrics: Arc<CenterMetrics>) -> Self {
        Self {
            waiting_area: Mutex::new(WaitingArea {
                chairs: CapacityPool::new(chairs),
                admissions: AdmissionQueue::new(),
                total_requests: 0,
            }),
            tutoring_area: Mutex::new(TutoringArea::default()),
            admission_available: Semaphore::new(0),
            tutor_available: Semaphore::new(0),
            arrival_clock: AtomicU64::new(0),
            metrics,
            events: None,
        }
    }

    /// Forward every [`CenterEvent`] to `sender` as it happens.
    #[must_use]
    pub fn with_event_sink(mut self, sender: mpsc::UnboundedSender<CenterEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Lock the waiting area (chairs and admission queue).
    pub async fn waiting_area(&self) -> MutexGuard<'_, WaitingArea> {
        self.waiting_area.lock().await
    }

    /// Lock the tutoring area (dispatch queue and session counters).
    pub async fn tutoring_area(&self) -> MutexGuard<'_, TutoringArea> {
        self.tutoring_area.lock().await
    }

    /// Mint the next arrival sequence number (first call returns 1).
    pub fn next_arrival(&self) -> u64 {
        self.arrival_clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Raise the "admission available" signal once.
    pub fn signal_admission(&self) {
        self.admission_available.add_permits(1);
    }

    /// Wait for, and consume, one "admission available" unit.
    ///
    /// # Errors
    ///
    /// Returns [`TutoringError::ChannelClosed`] if the signal was closed.
    pub async fn wait_for_admission(&self) -> Result<(), TutoringError> {
        self.admission_available
            .acquire()
            .await
            .map(|permit| permit.forget())
            .map_err(|_| TutoringError::ChannelClosed("admission signal closed".to_string()))
    }

    /// Raise the "tutor available" signal once.
    pub fn signal_tutor(&self) {
        self.tutor_available.add_permits(1);
    }

    /// Wait for, and consume, one "tutor available" unit.
    ///
    /// # Errors
    ///
    /// Returns [`TutoringError::ChannelClosed`] if the signal was closed.
    pub async fn wait_for_tutor(&self) -> Result<(), TutoringError> {
        self.tutor_available
            .acquire()
            .await
            .map(|permit| permit.forget())
            .map_err(|_| TutoringError::ChannelClosed("tutor signal closed".to_string()))
    }

    /// Unconsumed "admission available" units.
    #[must_use]
    pub fn pending_admission_signals(&self) -> usize {
        self.admission_available.available_permits()
    }

    /// Unconsumed "tutor available" units.
    #[must_use]
    pub fn pending_tutor_signals(&self) -> usize {
        self.tutor_available.available_permits()
    }

    /// Close both counting signals, waking every waiter with an error.
    pub fn close(&self) {
        self.admission_available.close();
        self.tutor_available.close();
    }

    /// Shared counters.
    #[must_use]
    pub fn metrics(&self) -> &Arc<CenterMetrics> {
        &self.metrics
    }

    /// Record an event. A closed or absent sink drops it.
    pub fn emit(&self, event: CenterEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// Read both areas, one lock after the other.
    pub async fn snapshot(&self) -> CenterSnapshot {
        let (chairs_available, total_chairs, admission_queue_len, total_requests) = {
            let waiting = self.waiting_area().await;
            (
                waiting.chairs.available(),
                waiting.chairs.total(),
                waiting.admissions.len(),
                waiting.total_requests,
            )
        };

        let tutoring = self.tutoring_area().await;
        CenterSnapshot {
            chairs_available,
            total_chairs,
            admission_queue_len,
            dispatch_queue_len: tutoring.dispatch.len(),
            total_requests,
            tutored_now: tutoring.tutored_now,
            total_sessions: tutoring.total_sessions,
        }
    }
}
