//! `StudentActor` - one per student (producer side of the protocol).
//!
//! Each iteration of [`StudentActor::run`] walks the cycle
//! `Working -> SeekingSeat -> (Seated -> AwaitingHelp -> HelpReceived) | Rejected`:
//! 1. Works for a random delay without holding any lock
//! 2. Tries to take a chair under the waiting-area lock; on success enqueues
//!    an admission record carrying its own completion channel and signals the
//!    coordinator, on failure logs the rejection and goes back to work
//! 3. Awaits its targeted completion, counts the help, and gives the chair back
//!
//! The actor exits once it has received the configured number of sessions.

use crate::errors::TutoringError;

use super::messages::{CenterEvent, SessionComplete, StudentRecord, StudentTicket};
use super::metrics::ActorType;
use crate::center::TutoringCenter;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Outcome of one finished student actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentSummary {
    pub student_id: u32,
    pub helps_received: u32,
    /// Attempts that found every chair taken.
    pub rejections: u64,
}

/// The `StudentActor` implementation.
pub struct StudentActor {
    student_id: u32,
    max_helps: u32,
    helps_received: u32,
    rejections: u64,
    work_delay_max: Duration,
    rng: SmallRng,
    center: Arc<TutoringCenter>,
    cancel_token: CancellationToken,
}

impl StudentActor {
    /// Create a student (not started).
    ///
    /// With a `seed`, the work delays are reproducible per student identity.
    #[must_use]
    pub fn new(
        student_id: u32,
        max_helps: u32,
        work_delay_max: Duration,
        seed: Option<u64>,
        center: Arc<TutoringCenter>,
        cancel_token: CancellationToken,
    ) -> Self {
        let rng = match seed {
            Some(seed) => {
                SmallRng::seed_from_u64(seed ^ u64::from(student_id).wrapping_mul(MIXING_CONSTANT))
            }
            None => SmallRng::from_entropy(),
        };

        Self {
            student_id,
            max_helps,
            helps_received: 0,
            rejections: 0,
            work_delay_max,
            rng,
            center,
            cancel_token,
        }
    }

    /// Spawn the student on the current runtime.
    pub fn spawn(self) -> JoinHandle<Result<StudentSummary, TutoringError>> {
        tokio::spawn(self.run())
    }

    /// Run until the student has received every session.
    #[instrument(skip_all, name = "student", fields(student_id = self.student_id))]
    pub async fn run(mut self) -> Result<StudentSummary, TutoringError> {
        debug!(
            target: "tutoring.actor.student",
            student_id = self.student_id,
            max_helps = self.max_helps,
            "StudentActor started"
        );

        while self.helps_received < self.max_helps {
            if self.cancel_token.is_cancelled() {
                return Err(TutoringError::Cancelled);
            }

            self.work().await;

            let Some((completion, seated_at)) = self.take_seat().await else {
                continue;
            };

            let outcome = match self.await_help(completion).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if !matches!(e, TutoringError::Cancelled) {
                        error!(
                            target: "tutoring.actor.student",
                            student_id = self.student_id,
                            error = %e,
                            "StudentActor failed while awaiting help"
                        );
                        self.center
                            .metrics()
                            .record_actor_failure(ActorType::Student);
                        self.cancel_token.cancel();
                    }
                    return Err(e);
                }
            };

            self.helps_received += 1;
            self.center.metrics().record_help_wait(seated_at.elapsed());
            self.center.emit(CenterEvent::HelpReceived {
                student_id: self.student_id,
                tutor_id: outcome.tutor_id,
                helps_received: self.helps_received,
            });
            info!(
                target: "tutoring.actor.student",
                student_id = self.student_id,
                tutor_id = outcome.tutor_id,
                session = outcome.session,
                helps_received = self.helps_received,
                "S: Student {} received help from Tutor {}",
                self.student_id,
                outcome.tutor_id
            );

            if let Err(e) = self.release_seat().await {
                error!(
                    target: "tutoring.actor.student",
                    student_id = self.student_id,
                    error = %e,
                    "StudentActor failed to release its chair"
                );
                self.center
                    .metrics()
                    .record_actor_failure(ActorType::Student);
                self.cancel_token.cancel();
                return Err(e);
            }
        }

        debug!(
            target: "tutoring.actor.student",
            student_id = self.student_id,
            helps_received = self.helps_received,
            rejections = self.rejections,
            "StudentActor finished"
        );

        Ok(StudentSummary {
            student_id: self.student_id,
            helps_received: self.helps_received,
            rejections: self.rejections,
        })
    }

    /// Simulated independent work. Holds no lock.
    async fn work(&mut self) {
        let max_us = u64::try_from(self.work_delay_max.as_micros()).unwrap_or(u64::MAX);
        if max_us == 0 {
            tokio::task::yield_now().await;
            return;
        }
        let delay = Duration::from_micros(self.rng.gen_range(0..max_us));
        tokio::time::sleep(delay).await;
    }

    /// Try to take a chair and enqueue an admission record.
    ///
    /// Returns the completion receiver for the enqueued record, or `None` if
    /// every chair was taken.
    async fn take_seat(&mut self) -> Option<(oneshot::Receiver<SessionComplete>, Instant)> {
        let mut waiting = self.center.waiting_area().await;

        if !waiting.chairs.try_acquire() {
            drop(waiting);
            self.rejections += 1;
            self.center.metrics().record_seat_rejected();
            self.center.emit(CenterEvent::SeatUnavailable {
                student_id: self.student_id,
            });
            info!(
                target: "tutoring.actor.student",
                student_id = self.student_id,
                "S: Student {} found no empty chair. Will try again later",
                self.student_id
            );
            return None;
        }

        let chairs_available = waiting.chairs.available();
        let ticket = StudentTicket {
            student_id: self.student_id,
            priority: self.helps_received,
            arrival: self.center.next_arrival(),
        };
        let (respond_to, completion) = oneshot::channel();
        waiting
            .admissions
            .insert(StudentRecord::new(ticket, respond_to));

        self.center
            .metrics()
            .record_seat_acquired(waiting.chairs.occupied(), chairs_available);
        self.center.emit(CenterEvent::SeatTaken {
            student_id: self.student_id,
            priority: ticket.priority,
            arrival: ticket.arrival,
            chairs_available,
        });
        info!(
            target: "tutoring.actor.student",
            student_id = self.student_id,
            priority = ticket.priority,
            arrival = ticket.arrival,
            chairs_available,
            "S: Student {} takes a seat. Empty chairs = {}",
            self.student_id,
            chairs_available
        );

        self.center.signal_admission();
        drop(waiting);

        Some((completion, Instant::now()))
    }

    /// Block until a tutor completes this student's record.
    async fn await_help(
        &self,
        completion: oneshot::Receiver<SessionComplete>,
    ) -> Result<SessionComplete, TutoringError> {
        let outcome = tokio::select! {
            () = self.cancel_token.cancelled() => return Err(TutoringError::Cancelled),
            received = completion => received.map_err(|_| {
                TutoringError::ChannelClosed(format!(
                    "completion for student {} dropped before delivery",
                    self.student_id
                ))
            })?,
        };

        if outcome.student_id != self.student_id {
            return Err(TutoringError::InvariantViolation(format!(
                "student {} woken by completion for student {}",
                self.student_id, outcome.student_id
            )));
        }

        Ok(outcome)
    }

    /// Give the chair back under the waiting-area lock.
    async fn release_seat(&self) -> Result<(), TutoringError> {
        let mut waiting = self.center.waiting_area().await;
        waiting.chairs.release()?;

        let chairs_available = waiting.chairs.available();
        self.center.metrics().record_seat_released(chairs_available);
        self.center.emit(CenterEvent::SeatReleased {
            student_id: self.student_id,
            chairs_available,
        });
        info!(
            target: "tutoring.actor.student",
            student_id = self.student_id,
            chairs_available,
            "S: Student {} leaves the chair. Empty chairs = {}",
            self.student_id,
            chairs_available
        );
        Ok(())
    }
}
