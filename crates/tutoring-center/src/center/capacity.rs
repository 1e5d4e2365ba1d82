//! Waiting-room chairs.
//!
//! The pool itself holds no lock; it lives inside the waiting area and is only
//! touched while the waiting-area mutex is held.

use crate::errors::TutoringError;

/// Bounded counter of free chairs. Invariant: `0 <= available <= total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityPool {
    available: u32,
    total: u32,
}

impl CapacityPool {
    /// Create a pool with every chair free.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            available: total,
            total,
        }
    }

    /// Take a chair if one is free. Never blocks.
    pub fn try_acquire(&mut self) -> bool {
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        true
    }

    /// Give a chair back.
    ///
    /// # Errors
    ///
    /// Returns [`TutoringError::InvariantViolation`] if every chair is already
    /// free; each release must pair with exactly one earlier acquire.
    pub fn release(&mut self) -> Result<(), TutoringError> {
        if self.available >= self.total {
            return Err(TutoringError::InvariantViolation(format!(
                "chair released with all {} chairs already free",
                self.total
            )));
        }
        self.available += 1;
        Ok(())
    }

    #[must_use]
    pub fn available(&self) -> u32 {
        self.available
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Chairs currently held by students.
    #[must_use]
    pub fn occupied(&self) -> u32 {
        self.total - self.available
    }
}
