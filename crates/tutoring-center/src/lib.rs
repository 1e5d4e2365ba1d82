//! Tutoring Center Library
//!
//! A concurrent simulation of a tutoring center with a bounded waiting room:
//!
//! - Students alternate between independent work and seeking help
//! - A single coordinator moves seated students from a priority-ordered
//!   admission queue to a FIFO dispatch queue
//! - Tutors serve dispatched students one at a time and wake exactly the
//!   student they served
//!
//! # Architecture
//!
//! ```text
//! Simulation
//! ├── CoordinatorActor (singleton)
//! ├── N TutorActors
//! └── N StudentActors
//!         all sharing one Arc<TutoringCenter>
//!         ├── WaitingArea  (chairs + admission queue)   behind one Mutex
//!         └── TutoringArea (dispatch queue + counters)  behind another
//! ```
//!
//! # Key Design Decisions
//!
//! - **Fewer sessions first**: admission priority is the number of sessions a
//!   student has already received, ties broken by arrival order
//! - **Targeted completion**: each admission record carries its own
//!   completion channel
//! - **Fail loudly**: a protocol violation in any actor cancels the whole run
//!
//! # Modules
//!
//! - [`actors`] - Student, coordinator and tutor actors
//! - [`center`] - Shared state: capacity pool, queues, signals
//! - [`config`] - Command-line and environment configuration
//! - [`errors`] - Error types with exit codes
//! - [`observability`] - Metrics facade
//! - [`simulation`] - Spawning, shutdown and the run report

pub mod actors;
pub mod center;
pub mod config;
pub mod errors;
pub mod observability;
pub mod simulation;
