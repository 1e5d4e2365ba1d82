//! `CoordinatorActor` - singleton broker between the two queues.
//!
//! The coordinator is the only consumer of the admission queue:
//!
//! 1. Waits for one "admission available" unit
//! 2. Under the waiting-area lock, removes the highest-priority student and
//!    bumps `total_requests`
//! 3. Under the tutoring-area lock, appends the student to the dispatch queue,
//!    then raises "tutor available" once
//!
//! It runs until its `CancellationToken` is cancelled.

use crate::errors::TutoringError;

use super::messages::CenterEvent;
use super::metrics::ActorType;
use crate::center::TutoringCenter;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// What one coordinator step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStep {
    /// A student moved from the admission queue to the dispatch queue.
    Dispatched { student_id: u32 },
    /// Woken with an empty admission queue; nothing moved.
    Idle,
}

/// The `CoordinatorActor` implementation.
pub struct CoordinatorActor {
    center: Arc<TutoringCenter>,
    cancel_token: CancellationToken,
    /// Wake-ups that found the admission queue empty.
    idle_wakeups: u64,
}

impl CoordinatorActor {
    #[must_use]
    pub fn new(center: Arc<TutoringCenter>, cancel_token: CancellationToken) -> Self {
        Self {
            center,
            cancel_token,
            idle_wakeups: 0,
        }
    }

    /// Spawn the coordinator on the current runtime.
    pub fn spawn(self) -> JoinHandle<Result<(), TutoringError>> {
        tokio::spawn(self.run())
    }

    /// Run the broker loop until cancelled.
    ///
    /// On error the simulation token is cancelled so that waiting students
    /// stop instead of hanging.
    #[instrument(skip_all, name = "coordinator")]
    pub async fn run(mut self) -> Result<(), TutoringError> {
        info!(target: "tutoring.actor.coordinator", "CoordinatorActor started");

        let result = self.serve().await;

        match &result {
            Ok(()) => info!(
                target: "tutoring.actor.coordinator",
                idle_wakeups = self.idle_wakeups,
                "CoordinatorActor stopped"
            ),
            Err(e) => {
                error!(
                    target: "tutoring.actor.coordinator",
                    error = %e,
                    "CoordinatorActor failed"
                );
                self.center
                    .metrics()
                    .record_actor_failure(ActorType::Coordinator);
                self.cancel_token.cancel();
            }
        }

        result
    }

    async fn serve(&mut self) -> Result<(), TutoringError> {
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "tutoring.actor.coordinator",
                        "CoordinatorActor received cancellation signal"
                    );
                    return Ok(());
                }

                signal = self.center.wait_for_admission() => {
                    signal?;
                    if self.dispatch_next().await == CoordinatorStep::Idle {
                        self.idle_wakeups += 1;
                    }
                }
            }
        }
    }

    /// Move one student from the admission queue to the dispatch queue.
    ///
    /// Callers must have consumed one "admission available" unit first.
    pub async fn dispatch_next(&self) -> CoordinatorStep {
        let record = {
            let mut waiting = self.center.waiting_area().await;

            let Some(record) = waiting.admissions.remove_front() else {
                drop(waiting);
                warn!(
                    target: "tutoring.actor.coordinator",
                    "Woken with an empty admission queue"
                );
                return CoordinatorStep::Idle;
            };

            waiting.total_requests += 1;
            let ticket = record.ticket();
            let waiting_now = waiting.chairs.occupied();
            let total_requests = waiting.total_requests;

            self.center.metrics().record_admission();
            self.center.emit(CenterEvent::Admitted {
                student_id: ticket.student_id,
                priority: ticket.priority,
                arrival: ticket.arrival,
                waiting_now,
                total_requests,
            });
            info!(
                target: "tutoring.actor.coordinator",
                student_id = ticket.student_id,
                priority = ticket.priority,
                arrival = ticket.arrival,
                waiting_now,
                total_requests,
                "C: Student {} with priority {} added to the queue. Waiting students now = {}. Total requests = {}",
                ticket.student_id,
                ticket.priority,
                waiting_now,
                total_requests
            );

            record
        };

        let student_id = record.student_id();
        {
            let mut tutoring = self.center.tutoring_area().await;
            tutoring.dispatch.insert(record);
            let queue_depth = tutoring.dispatch.len();

            self.center.metrics().record_dispatch(queue_depth);
            self.center.emit(CenterEvent::Dispatched {
                student_id,
                queue_depth,
            });
            info!(
                target: "tutoring.actor.coordinator",
                student_id,
                queue_depth,
                "C: Student {} dispatched to the tutors. Students awaiting a tutor = {}",
                student_id,
                queue_depth
            );
        }

        self.center.signal_tutor();
        CoordinatorStep::Dispatched { student_id }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actors::messages::{StudentRecord, StudentTicket};
    use crate::actors::metrics::CenterMetrics;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn center() -> Arc<TutoringCenter> {
        Arc::new(TutoringCenter::new(8, CenterMetrics::new()))
    }

    async fn admit(center: &TutoringCenter, student_id: u32, priority: u32) {
        let mut waiting = center.waiting_area().await;
        assert!(waiting.chairs.try_acquire());
        let (tx, _rx) = oneshot::channel();
        waiting.admissions.insert(StudentRecord::new(
            StudentTicket {
                student_id,
                priority,
                arrival: center.next_arrival(),
            },
            tx,
        ));
        center.signal_admission();
    }

    #[tokio::test]
    async fn test_dispatch_next_moves_front_student() {
        let center = center();
        admit(&center, 1, 0).await;

        let coordinator = CoordinatorActor::new(Arc::clone(&center), CancellationToken::new());
        let step = coordinator.dispatch_next().await;

        assert_eq!(step, CoordinatorStep::Dispatched { student_id: 1 });
        let snapshot = center.snapshot().await;
        assert_eq!(snapshot.admission_queue_len, 0);
        assert_eq!(snapshot.dispatch_queue_len, 1);
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(center.pending_tutor_signals(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_next_on_empty_queue_is_idle() {
        let center = center();
        let coordinator = CoordinatorActor::new(Arc::clone(&center), CancellationToken::new());

        assert_eq!(coordinator.dispatch_next().await, CoordinatorStep::Idle);
        assert_eq!(center.pending_tutor_signals(), 0);
        assert_eq!(center.snapshot().await.total_requests, 0);
    }

    #[tokio::test]
    async fn test_coordinator_dispatches_in_priority_order() {
        let center = center();
        admit(&center, 1, 2).await;
        admit(&center, 2, 0).await;
        admit(&center, 3, 1).await;
        admit(&center, 4, 0).await;

        let token = CancellationToken::new();
        let handle = CoordinatorActor::new(Arc::clone(&center), token.clone()).spawn();

        while center.pending_tutor_signals() < 4 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        token.cancel();
        handle.await.unwrap().unwrap();

        let tutoring = center.tutoring_area().await;
        let order: Vec<u32> = tutoring.dispatch.tickets().map(|t| t.student_id).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
    }

    #[tokio::test]
    async fn test_coordinator_stops_on_cancellation() {
        let center = center();
        let token = CancellationToken::new();
        let handle = CoordinatorActor::new(Arc::clone(&center), token.clone()).spawn();

        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_closed_signal_fails_and_cancels() {
        let center = center();
        let token = CancellationToken::new();
        let handle = CoordinatorActor::new(Arc::clone(&center), token.clone()).spawn();

        tokio::task::yield_now().await;
        center.close();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(TutoringError::ChannelClosed(_))));
        assert!(token.is_cancelled());
        assert_eq!(center.metrics().snapshot().actor_failures, 1);
    }
}
