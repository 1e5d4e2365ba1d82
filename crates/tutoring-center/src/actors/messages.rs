//! Message types exchanged between actors.
//!
//! A student's admission travels as a [`StudentRecord`] through the admission
//! queue and the dispatch queue. The record owns a `tokio::sync::oneshot`
//! sender back to the student that created it, so the tutor that serves the
//! record can only ever wake that student.

use crate::errors::TutoringError;
use std::cmp::Ordering;
use tokio::sync::oneshot;

/// Ordering key of an admission: who is asking, how often they were already
/// helped, and when they sat down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudentTicket {
    /// Student identity (1-based).
    pub student_id: u32,
    /// Help sessions already received. Lower values are served first.
    pub priority: u32,
    /// Arrival sequence number minted by the center's arrival clock.
    pub arrival: u64,
}

impl Ord for StudentTicket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.arrival.cmp(&other.arrival))
    }
}

impl PartialOrd for StudentTicket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Notification delivered to exactly one student when its session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionComplete {
    /// Tutor that served the student.
    pub tutor_id: u32,
    /// Student the tutor served (copied from the record).
    pub student_id: u32,
    /// Center-wide session number assigned when tutoring started.
    pub session: u64,
}

/// An admitted student waiting in one of the queues.
#[derive(Debug)]
pub struct StudentRecord {
    ticket: StudentTicket,
    /// Targeted completion channel back to the owning student.
    respond_to: oneshot::Sender<SessionComplete>,
}

impl StudentRecord {
    /// Create a record for `ticket` that reports completion on `respond_to`.
    #[must_use]
    pub fn new(ticket: StudentTicket, respond_to: oneshot::Sender<SessionComplete>) -> Self {
        Self { ticket, respond_to }
    }

    /// The ordering key of this record.
    #[must_use]
    pub fn ticket(&self) -> StudentTicket {
        self.ticket
    }

    /// The student this record belongs to.
    #[must_use]
    pub fn student_id(&self) -> u32 {
        self.ticket.student_id
    }

    /// Consume the record and wake its student.
    ///
    /// # Errors
    ///
    /// Returns [`TutoringError::ChannelClosed`] if the student stopped waiting.
    pub fn complete(self, tutor_id: u32, session: u64) -> Result<(), TutoringError> {
        let student_id = self.ticket.student_id;
        self.respond_to
            .send(SessionComplete {
                tutor_id,
                student_id,
                session,
            })
            .map_err(|_| {
                TutoringError::ChannelClosed(format!(
                    "student {student_id} stopped waiting for session {session}"
                ))
            })
    }
}

/// Narrated simulation events, in the order they happened.
///
/// Every variant carries the acting identity and the shared counters observed
/// under the lock that guarded the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterEvent {
    /// A student occupied a chair and joined the admission queue.
    SeatTaken {
        student_id: u32,
        priority: u32,
        arrival: u64,
        chairs_available: u32,
    },
    /// A student found every chair taken and will retry later.
    SeatUnavailable { student_id: u32 },
    /// The coordinator removed a student from the admission queue.
    Admitted {
        student_id: u32,
        priority: u32,
        arrival: u64,
        waiting_now: u32,
        total_requests: u64,
    },
    /// The coordinator placed a student on the dispatch queue.
    Dispatched { student_id: u32, queue_depth: usize },
    /// A tutor took a student off the dispatch queue.
    TutoringStarted {
        student_id: u32,
        tutor_id: u32,
        tutored_now: u32,
        total_sessions: u64,
    },
    /// A tutor finished a session.
    TutoringFinished {
        student_id: u32,
        tutor_id: u32,
        tutored_now: u32,
    },
    /// A student received the completion notice for its session.
    HelpReceived {
        student_id: u32,
        tutor_id: u32,
        helps_received: u32,
    },
    /// A student gave its chair back.
    SeatReleased {
        student_id: u32,
        chairs_available: u32,
    },
}

impl CenterEvent {
    /// The student this event concerns.
    #[must_use]
    pub fn student_id(&self) -> u32 {
        match *self {
            CenterEvent::SeatTaken { student_id, .. }
            | CenterEvent::SeatUnavailable { student_id }
            | CenterEvent::Admitted { student_id, .. }
            | CenterEvent::Dispatched { student_id, .. }
            | CenterEvent::TutoringStarted { student_id, .. }
            | CenterEvent::TutoringFinished { student_id, .. }
            | CenterEvent::HelpReceived { student_id, .. }
            | CenterEvent::SeatReleased { student_id, .. } => student_id,
        }
    }

    /// Short label used for grouping events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            CenterEvent::SeatTaken { .. } => "seat_taken",
            CenterEvent::SeatUnavailable { .. } => "seat_unavailable",
            CenterEvent::Admitted { .. } => "admitted",
            CenterEvent::Dispatched { .. } => "dispatched",
            CenterEvent::TutoringStarted { .. } => "tutoring_started",
            CenterEvent::TutoringFinished { .. } => "tutoring_finished",
            CenterEvent::HelpReceived { .. } => "help_received",
            CenterEvent::SeatReleased { .. } => "seat_released",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ticket(student_id: u32, priority: u32, arrival: u64) -> StudentTicket {
        StudentTicket {
            student_id,
            priority,
            arrival,
        }
    }

    #[test]
    fn test_ticket_orders_by_priority_then_arrival() {
        assert!(ticket(1, 0, 9) < ticket(2, 1, 1));
        assert!(ticket(1, 2, 3) < ticket(2, 2, 4));
        assert_eq!(
            ticket(1, 2, 3).cmp(&ticket(7, 2, 3)),
            Ordering::Equal,
            "identity does not take part in ordering"
        );
    }

    #[tokio::test]
    async fn test_complete_reaches_owning_student() {
        let (tx, rx) = oneshot::channel();
        let record = StudentRecord::new(ticket(4, 1, 12), tx);

        record.complete(2, 30).unwrap();

        let outcome = rx.await.unwrap();
        assert_eq!(
            outcome,
            SessionComplete {
                tutor_id: 2,
                student_id: 4,
                session: 30,
            }
        );
    }

    #[test]
    fn test_complete_after_student_left_is_error() {
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let record = StudentRecord::new(ticket(4, 1, 12), tx);

        let err = record.complete(2, 30).unwrap_err();
        assert!(matches!(err, TutoringError::ChannelClosed(_)));
    }

    #[test]
    fn test_event_accessors() {
        let event = CenterEvent::TutoringStarted {
            student_id: 3,
            tutor_id: 1,
            tutored_now: 1,
            total_sessions: 5,
        };
        assert_eq!(event.student_id(), 3);
        assert_eq!(event.kind(), "tutoring_started");
        let unavailable = CenterEvent::SeatUnavailable { student_id: 9 };
        assert_eq!(unavailable.student_id(), 9);
    }
}
