//! Simulation orchestration.
//!
//! Spawns one coordinator, `tutors` tutor actors and `students` student
//! actors around a fresh [`TutoringCenter`], waits for every student to
//! finish, then cancels the coordinator and tutors and checks the end-of-run
//! invariants.
//!
//! # Shutdown
//!
//! Students finish on their own. The coordinator and tutors loop forever, so
//! once the last student returns the root `CancellationToken` is cancelled and
//! their tasks are awaited with a timeout. If any actor fails, it cancels the
//! same token; every remaining actor then stops and the root cause is returned.

use crate::actors::{
    ActorType, CenterEvent, CenterMetrics, CenterMetricsSnapshot, CoordinatorActor, StudentActor,
    StudentSummary, TutorActor,
};
use crate::center::{CenterSnapshot, TutoringCenter};
use crate::config::Config;
use crate::errors::TutoringError;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// How long the coordinator and each tutor get to stop after cancellation.
pub const ACTOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// One summary per student, ordered by student id.
    pub students: Vec<StudentSummary>,
    /// `(tutor_id, sessions_served)` per tutor that stopped cleanly.
    pub tutor_sessions: Vec<(u32, u64)>,
    /// Final state of both areas.
    pub center: CenterSnapshot,
    /// Final counters.
    pub metrics: CenterMetricsSnapshot,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl SimulationReport {
    /// Sessions received across all students.
    #[must_use]
    pub fn total_helps(&self) -> u64 {
        self.students
            .iter()
            .map(|s| u64::from(s.helps_received))
            .sum()
    }

    /// Seat attempts that found the room full.
    #[must_use]
    pub fn total_rejections(&self) -> u64 {
        self.students.iter().map(|s| s.rejections).sum()
    }
}

/// One simulation run.
pub struct Simulation {
    config: Config,
    center: Arc<TutoringCenter>,
    cancel_token: CancellationToken,
}

impl Simulation {
    /// Prepare a run for `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let center = TutoringCenter::new(config.chairs, CenterMetrics::new());
        Self::with_center(config, center)
    }

    /// Prepare a run that also streams every [`CenterEvent`] to the returned
    /// receiver.
    #[must_use]
    pub fn with_event_stream(config: Config) -> (Self, mpsc::UnboundedReceiver<CenterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let center = TutoringCenter::new(config.chairs, CenterMetrics::new()).with_event_sink(tx);
        (Self::with_center(config, center), rx)
    }

    fn with_center(config: Config, center: TutoringCenter) -> Self {
        Self {
            config,
            center: Arc::new(center),
            cancel_token: CancellationToken::new(),
        }
    }

    /// The shared context this run operates on.
    #[must_use]
    pub fn center(&self) -> Arc<TutoringCenter> {
        Arc::clone(&self.center)
    }

    /// Token that aborts the run when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run to completion.
    ///
    /// # Errors
    ///
    /// Returns the first actor failure (preferring a root cause over the
    /// resulting [`TutoringError::Cancelled`]), or
    /// [`TutoringError::InvariantViolation`] if the end-of-run checks fail.
    #[instrument(skip_all, name = "simulation")]
    pub async fn run(self) -> Result<SimulationReport, TutoringError> {
        let started = Instant::now();
        let config = &self.config;

        info!(
            target: "tutoring.simulation",
            students = config.students,
            tutors = config.tutors,
            chairs = config.chairs,
            helps = config.helps,
            "Starting simulation"
        );

        let coordinator =
            CoordinatorActor::new(Arc::clone(&self.center), self.cancel_token.clone()).spawn();

        let tutors: Vec<_> = (1..=config.tutors)
            .map(|tutor_id| {
                let actor = TutorActor::new(
                    tutor_id,
                    config.tutoring_delay,
                    Arc::clone(&self.center),
                    self.cancel_token.clone(),
                );
                (tutor_id, actor.spawn())
            })
            .collect();

        let mut students = JoinSet::new();
        for student_id in 1..=config.students {
            let actor = StudentActor::new(
                student_id,
                config.helps,
                config.work_delay_max,
                config.seed,
                Arc::clone(&self.center),
                self.cancel_token.clone(),
            );
            students.spawn(actor.run());
        }

        let mut failure: Option<TutoringError> = None;
        let mut summaries = Vec::with_capacity(students.len());

        while let Some(joined) = students.join_next().await {
            match joined {
                Ok(Ok(summary)) => {
                    debug!(
                        target: "tutoring.simulation",
                        student_id = summary.student_id,
                        "Student finished"
                    );
                    summaries.push(summary);
                }
                Ok(Err(e)) => {
                    self.cancel_token.cancel();
                    keep_root_cause(&mut failure, e);
                }
                Err(join_error) => {
                    self.fail_on_panic(ActorType::Student, &join_error);
                    keep_root_cause(&mut failure, panicked("student", &join_error));
                }
            }
        }

        // Every student is done (or the run failed): stop the servers.
        self.cancel_token.cancel();

        match tokio::time::timeout(ACTOR_SHUTDOWN_TIMEOUT, coordinator).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => keep_root_cause(&mut failure, e),
            Ok(Err(join_error)) => {
                self.fail_on_panic(ActorType::Coordinator, &join_error);
                keep_root_cause(&mut failure, panicked("coordinator", &join_error));
            }
            Err(_) => warn!(
                target: "tutoring.simulation",
                "Coordinator shutdown timed out"
            ),
        }

        let mut tutor_sessions = Vec::with_capacity(tutors.len());
        for (tutor_id, handle) in tutors {
            match tokio::time::timeout(ACTOR_SHUTDOWN_TIMEOUT, handle).await {
                Ok(Ok(Ok(served))) => tutor_sessions.push((tutor_id, served)),
                Ok(Ok(Err(e))) => keep_root_cause(&mut failure, e),
                Ok(Err(join_error)) => {
                    self.fail_on_panic(ActorType::Tutor, &join_error);
                    keep_root_cause(&mut failure, panicked("tutor", &join_error));
                }
                Err(_) => warn!(
                    target: "tutoring.simulation",
                    tutor_id,
                    "Tutor shutdown timed out"
                ),
            }
        }

        if let Some(e) = failure {
            error!(target: "tutoring.simulation", error = %e, "Simulation failed");
            return Err(e);
        }

        summaries.sort_by_key(|s| s.student_id);
        let report = SimulationReport {
            students: summaries,
            tutor_sessions,
            center: self.center.snapshot().await,
            metrics: self.center.metrics().snapshot(),
            elapsed: started.elapsed(),
        };

        verify_report(config, &report)?;

        info!(
            target: "tutoring.simulation",
            total_requests = report.center.total_requests,
            total_sessions = report.center.total_sessions,
            rejections = report.total_rejections(),
            peak_occupied = report.metrics.peak_occupied,
            elapsed_ms = report.elapsed.as_millis(),
            "Simulation complete"
        );

        Ok(report)
    }

    fn fail_on_panic(&self, actor_type: ActorType, join_error: &JoinError) {
        error!(
            target: "tutoring.simulation",
            actor_type = actor_type.as_str(),
            error = ?join_error,
            "Actor task panicked"
        );
        self.center.metrics().record_actor_failure(actor_type);
        self.cancel_token.cancel();
    }
}

/// Keep the first meaningful error; a later root cause replaces `Cancelled`.
fn keep_root_cause(slot: &mut Option<TutoringError>, error: TutoringError) {
    match slot {
        None => *slot = Some(error),
        Some(TutoringError::Cancelled) if !matches!(error, TutoringError::Cancelled) => {
            *slot = Some(error);
        }
        Some(_) => {}
    }
}

fn panicked(role: &str, join_error: &JoinError) -> TutoringError {
    TutoringError::ActorPanicked(format!("{role} task: {join_error}"))
}

/// End-of-run checks: every chair back, every acquire paired with a release,
/// every student fully served.
fn verify_report(config: &Config, report: &SimulationReport) -> Result<(), TutoringError> {
    let center = &report.center;
    if center.chairs_available != center.total_chairs {
        return Err(TutoringError::InvariantViolation(format!(
            "{} of {} chairs still occupied after the run",
            center.total_chairs - center.chairs_available,
            center.total_chairs
        )));
    }

    let metrics = &report.metrics;
    if metrics.seats_acquired != metrics.seats_released {
        return Err(TutoringError::InvariantViolation(format!(
            "{} chairs acquired but {} released",
            metrics.seats_acquired, metrics.seats_released
        )));
    }

    if let Some(short) = report
        .students
        .iter()
        .find(|s| s.helps_received != config.helps)
    {
        return Err(TutoringError::InvariantViolation(format!(
            "student {} received {} of {} sessions",
            short.student_id, short.helps_received, config.helps
        )));
    }

    let expected_sessions = u64::from(config.students) * u64::from(config.helps);
    if center.total_sessions != expected_sessions || center.total_requests != expected_sessions {
        return Err(TutoringError::InvariantViolation(format!(
            "expected {expected_sessions} sessions, saw {} requests and {} sessions",
            center.total_requests, center.total_sessions
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn quick_config(students: u32, tutors: u32, chairs: u32, helps: u32) -> Config {
        Config::new(students, tutors, chairs, helps)
            .unwrap()
            .with_delays(Duration::from_micros(200), Duration::from_micros(50))
            .with_seed(42)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_serves_every_student() {
        let report = Simulation::new(quick_config(6, 2, 3, 2)).run().await.unwrap();

        assert_eq!(report.students.len(), 6);
        assert!(report.students.iter().all(|s| s.helps_received == 2));
        assert_eq!(report.total_helps(), 12);
        assert_eq!(report.center.total_sessions, 12);
        assert_eq!(report.center.chairs_available, 3);
        assert_eq!(report.tutor_sessions.iter().map(|(_, n)| n).sum::<u64>(), 12);
        assert!(report.metrics.peak_occupied <= 3);
    }

    #[tokio::test]
    async fn test_external_cancellation_aborts_run() {
        let config = quick_config(3, 1, 1, 1_000);
        let simulation = Simulation::new(config);
        let token = simulation.cancel_token();

        let run = tokio::spawn(simulation.run());
        tokio::time::sleep(Duration::from_millis(5)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(TutoringError::Cancelled)));
    }

    #[test]
    fn test_keep_root_cause_prefers_real_error() {
        let mut slot = None;
        keep_root_cause(&mut slot, TutoringError::Cancelled);
        keep_root_cause(
            &mut slot,
            TutoringError::InvariantViolation("over-release".to_string()),
        );
        keep_root_cause(&mut slot, TutoringError::ChannelClosed("later".to_string()));

        assert!(matches!(slot, Some(TutoringError::InvariantViolation(_))));
    }

    #[test]
    fn test_verify_report_detects_leaked_chair() {
        let config = quick_config(1, 1, 2, 1);
        let report = SimulationReport {
            students: vec![StudentSummary {
                student_id: 1,
                helps_received: 1,
                rejections: 0,
            }],
            tutor_sessions: vec![(1, 1)],
            center: CenterSnapshot {
                chairs_available: 1,
                total_chairs: 2,
                admission_queue_len: 0,
                dispatch_queue_len: 0,
                total_requests: 1,
                tutored_now: 0,
                total_sessions: 1,
            },
            metrics: CenterMetrics::new().snapshot(),
            elapsed: Duration::ZERO,
        };

        let err = verify_report(&config, &report).unwrap_err();
        assert!(matches!(err, TutoringError::InvariantViolation(_)));
        assert!(err.to_string().contains("occupied"));
    }
}
