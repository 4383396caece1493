//! Per-operation attempt bookkeeping.
//!
//! # Invariants
//! - The first attempt is try #1 (not #0)
//! - The operation start instant is fixed on try #1 and never changes
//! - Each `begin` increments the try count by exactly one
//!
//! One `OperationAttempt` belongs to one logical operation. It has no internal
//! synchronization; the owning service hands it out through `&mut self`.

use std::time::Duration;
use tokio::time::Instant;

/// Try counter and operation start time for one logical operation.
#[derive(Debug, Default)]
pub struct OperationAttempt {
    try_count: u32,
    operation_start: Option<Instant>,
}

/// Snapshot handed to one attempt when it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptStart {
    pub try_number: u32,
    pub operation_start: Instant,
}

/// Elapsed times measured for one finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTiming {
    pub try_number: u32,
    pub try_duration: Duration,
    pub operation_duration: Duration,
}

impl AttemptStart {
    /// Close the attempt that ran from `try_start` to `try_end`.
    pub fn finish(&self, try_start: Instant, try_end: Instant) -> AttemptTiming {
        AttemptTiming {
            try_number: self.try_number,
            try_duration: try_end.saturating_duration_since(try_start),
            operation_duration: try_end.saturating_duration_since(self.operation_start),
        }
    }
}

impl OperationAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next attempt at `now`.
    pub fn begin(&mut self, now: Instant) -> AttemptStart {
        self.try_count = self.try_count.saturating_add(1);
        let operation_start = *self.operation_start.get_or_insert(now);
        AttemptStart {
            try_number: self.try_count,
            operation_start,
        }
    }

    /// Number of attempts started so far.
    pub fn try_count(&self) -> u32 {
        self.try_count
    }

    /// Instant the first attempt started, if any.
    pub fn operation_start(&self) -> Option<Instant> {
        self.operation_start
    }
}
