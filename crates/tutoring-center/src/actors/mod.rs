//! Actor implementations for the tutoring center.
//!
//! ```text
//! StudentActor (one per student)
//! │   takes a chair, enqueues a StudentRecord, awaits its own completion
//! ▼
//! CoordinatorActor (singleton)
//! │   admission queue (priority) -> dispatch queue (FIFO)
//! ▼
//! TutorActor (one per tutor)
//!     serves one record at a time, completes it back to its student
//! ```
//!
//! # Key Design Decisions
//!
//! - **Shared context**: every actor holds an `Arc<TutoringCenter>`; there is
//!   no process-wide state
//! - **Counting signals**: `tokio::sync::Semaphore` permits pair 1:1 with queue
//!   insertions
//! - **Targeted completion**: each record carries a `tokio::sync::oneshot`
//!   sender, so a tutor can only wake the student it served
//! - **CancellationToken propagation**: the simulation cancels the coordinator
//!   and tutors once every student is done, and any failing actor cancels the
//!   whole run
//!
//! # Modules
//!
//! - [`student`] - `StudentActor`, the producer
//! - [`coordinator`] - `CoordinatorActor`, the broker
//! - [`tutor`] - `TutorActor`, the consumer
//! - [`messages`] - records, completion notices, and narrated events
//! - [`metrics`] - lock-free counters for the run report

pub mod coordinator;
pub mod messages;
pub mod metrics;
pub mod student;
pub mod tutor;

// Re-export primary types
pub use coordinator::{CoordinatorActor, CoordinatorStep};
pub use messages::*;
pub use metrics::{ActorType, CenterMetrics, CenterMetricsSnapshot};
pub use student::{StudentActor, StudentSummary};
pub use tutor::TutorActor;
