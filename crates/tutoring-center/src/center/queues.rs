//! The two queues between students, the coordinator, and tutors.
//!
//! - [`AdmissionQueue`]: sorted by `(priority, arrival)`, consumed by the
//!   coordinator only. Guarded by the waiting-area lock.
//! - [`DispatchQueue`]: strict FIFO, consumed by tutors only. Guarded by the
//!   tutoring-area lock.
//!
//! Neither queue has a capacity bound of its own. The chair pool upstream
//! limits how many records can exist at once.

use crate::actors::messages::{StudentRecord, StudentTicket};
use std::collections::VecDeque;

/// Priority queue of students waiting for the coordinator.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    records: Vec<StudentRecord>,
}

impl AdmissionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, keeping the queue sorted.
    ///
    /// Scans from the tail: the record lands behind every entry that sorts
    /// before or equal to it, so equal tickets keep arrival order.
    pub fn insert(&mut self, record: StudentRecord) {
        let ticket = record.ticket();
        let mut index = self.records.len();
        while let Some(previous) = index.checked_sub(1).and_then(|i| self.records.get(i)) {
            if previous.ticket() <= ticket {
                break;
            }
            index -= 1;
        }
        self.records.insert(index, record);
    }

    /// Remove the student with the fewest past sessions, earliest arrival first.
    pub fn remove_front(&mut self) -> Option<StudentRecord> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.records.remove(0))
    }

    /// Ticket of the next student to be admitted.
    #[must_use]
    pub fn peek(&self) -> Option<StudentTicket> {
        self.records.first().map(StudentRecord::ticket)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tickets in queue order.
    pub fn tickets(&self) -> impl Iterator<Item = StudentTicket> + '_ {
        self.records.iter().map(StudentRecord::ticket)
    }

    /// Whether the sort invariant holds.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| matches!(pair, [a, b] if a.ticket() <= b.ticket()))
    }
}

/// FIFO queue of admitted students waiting for a tutor.
#[derive(Debug, Default)]
pub struct DispatchQueue {
    records: VecDeque<StudentRecord>,
}

impl DispatchQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` to the tail.
    pub fn insert(&mut self, record: StudentRecord) {
        self.records.push_back(record);
    }

    /// Remove the oldest record.
    pub fn remove_front(&mut self) -> Option<StudentRecord> {
        self.records.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tickets in queue order.
    pub fn tickets(&self) -> impl Iterator<Item = StudentTicket> + '_ {
        self.records.iter().map(StudentRecord::ticket)
    }
}
