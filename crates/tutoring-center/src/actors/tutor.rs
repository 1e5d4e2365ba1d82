//! `TutorActor` - one per tutor (consumer side of the protocol).
//!
//! Each tutor serves one student at a time:
//!
//! 1. Waits for one "tutor available" unit
//! 2. Under the tutoring-area lock, takes the oldest dispatched student and
//!    bumps `tutored_now` and `total_sessions`
//! 3. Tutors without holding any lock
//! 4. Under the tutoring-area lock, decrements `tutored_now`, then wakes the
//!    served student through the record's own completion channel
//!
//! Tutors contend with each other only for the dispatch queue.

use crate::errors::TutoringError;

use super::messages::CenterEvent;
use super::metrics::ActorType;
use crate::center::TutoringCenter;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// The `TutorActor` implementation.
pub struct TutorActor {
    tutor_id: u32,
    tutoring_delay: Duration,
    center: Arc<TutoringCenter>,
    cancel_token: CancellationToken,
    sessions_served: u64,
}

impl TutorActor {
    #[must_use]
    pub fn new(
        tutor_id: u32,
        tutoring_delay: Duration,
        center: Arc<TutoringCenter>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            tutor_id,
            tutoring_delay,
            center,
            cancel_token,
            sessions_served: 0,
        }
    }

    /// Spawn the tutor on the current runtime.
    ///
    /// The join handle yields the number of sessions this tutor served.
    pub fn spawn(self) -> JoinHandle<Result<u64, TutoringError>> {
        tokio::spawn(self.run())
    }

    /// Run the service loop until cancelled.
    #[instrument(skip_all, name = "tutor", fields(tutor_id = self.tutor_id))]
    pub async fn run(mut self) -> Result<u64, TutoringError> {
        debug!(
            target: "tutoring.actor.tutor",
            tutor_id = self.tutor_id,
            "TutorActor started"
        );

        if let Err(e) = self.serve().await {
            error!(
                target: "tutoring.actor.tutor",
                tutor_id = self.tutor_id,
                error = %e,
                "TutorActor failed"
            );
            self.center.metrics().record_actor_failure(ActorType::Tutor);
            self.cancel_token.cancel();
            return Err(e);
        }

        debug!(
            target: "tutoring.actor.tutor",
            tutor_id = self.tutor_id,
            sessions_served = self.sessions_served,
            "TutorActor stopped"
        );
        Ok(self.sessions_served)
    }

    async fn serve(&mut self) -> Result<(), TutoringError> {
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => return Ok(()),

                signal = self.center.wait_for_tutor() => {
                    signal?;
                    if self.tutor_next().await? {
                        self.sessions_served += 1;
                    }
                }
            }
        }
    }

    /// Serve the oldest dispatched student.
    ///
    /// Returns `false` if woken with an empty dispatch queue, or if the run was
    /// cancelled before the served student took its completion. Callers must
    /// have consumed one "tutor available" unit first.
    ///
    /// # Errors
    ///
    /// Returns [`TutoringError::InvariantViolation`] if `tutored_now`
    /// underflows, or [`TutoringError::ChannelClosed`] if the served student
    /// stopped waiting while the run was still live.
    pub async fn tutor_next(&self) -> Result<bool, TutoringError> {
        let (record, session) = {
            let mut tutoring = self.center.tutoring_area().await;

            let Some(record) = tutoring.dispatch.remove_front() else {
                drop(tutoring);
                warn!(
                    target: "tutoring.actor.tutor",
                    tutor_id = self.tutor_id,
                    "Woken with an empty dispatch queue"
                );
                return Ok(false);
            };

            tutoring.tutored_now += 1;
            tutoring.total_sessions += 1;
            let tutored_now = tutoring.tutored_now;
            let total_sessions = tutoring.total_sessions;

            self.center.metrics().record_tutoring_started(tutored_now);
            self.center.emit(CenterEvent::TutoringStarted {
                student_id: record.student_id(),
                tutor_id: self.tutor_id,
                tutored_now,
                total_sessions,
            });
            info!(
                target: "tutoring.actor.tutor",
                student_id = record.student_id(),
                tutor_id = self.tutor_id,
                tutored_now,
                total_sessions,
                "T: Student {} tutored by Tutor {}. Students tutored now = {}. Total sessions tutored = {}",
                record.student_id(),
                self.tutor_id,
                tutored_now,
                total_sessions
            );

            (record, total_sessions)
        };

        tokio::time::sleep(self.tutoring_delay).await;

        {
            let mut tutoring = self.center.tutoring_area().await;
            tutoring.tutored_now = tutoring.tutored_now.checked_sub(1).ok_or_else(|| {
                TutoringError::InvariantViolation(format!(
                    "tutor {} finished a session with no session in progress",
                    self.tutor_id
                ))
            })?;
            let tutored_now = tutoring.tutored_now;

            self.center.metrics().record_session_completed(tutored_now);
            self.center.emit(CenterEvent::TutoringFinished {
                student_id: record.student_id(),
                tutor_id: self.tutor_id,
                tutored_now,
            });
            info!(
                target: "tutoring.actor.tutor",
                student_id = record.student_id(),
                tutor_id = self.tutor_id,
                tutored_now,
                "T: Tutor {} finished with Student {}. Students tutored now = {}",
                self.tutor_id,
                record.student_id(),
                tutored_now
            );
        }

        let student_id = record.student_id();
        if let Err(e) = record.complete(self.tutor_id, session) {
            // A cancelled student stops waiting; only an uncancelled drop is a defect.
            if self.cancel_token.is_cancelled() {
                debug!(
                    target: "tutoring.actor.tutor",
                    student_id,
                    tutor_id = self.tutor_id,
                    "Served student left after cancellation"
                );
                return Ok(false);
            }
            return Err(e);
        }
        Ok(true)
    }
}
