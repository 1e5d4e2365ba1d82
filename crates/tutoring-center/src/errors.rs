//! Tutoring Center error types.
//!
//! Seat contention is not represented here: a student finding no free chair is
//! an expected outcome that is logged and retried. Everything in this module is
//! either a configuration problem (raised before any actor starts) or a defect
//! in the coordination protocol that must stop the simulation.

use crate::config::ConfigError;
use thiserror::Error;

/// Tutoring Center error type.
#[derive(Debug, Error)]
pub enum TutoringError {
    /// Configuration rejected before the simulation started.
    #[error("Configuration error")]
    Config(#[from] ConfigError),

    /// A protocol invariant was broken (over-release, counter underflow).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A handoff channel closed before its message was delivered.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// An actor task panicked or was aborted.
    #[error("Actor failed: {0}")]
    ActorPanicked(String),

    /// The simulation was cancelled before every student finished.
    #[error("Simulation cancelled")]
    Cancelled,
}

impl TutoringError {
    /// Process exit code for this error.
    ///
    /// Configuration errors use the conventional usage code (2), protocol
    /// defects use 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            TutoringError::Config(_) => 2,
            TutoringError::InvariantViolation(_)
            | TutoringError::ChannelClosed(_)
            | TutoringError::ActorPanicked(_)
            | TutoringError::Cancelled => 1,
        }
    }
}
