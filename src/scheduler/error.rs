//! Scheduler error types

use core::fmt;

/// Result type for scheduler operations
pub type Result<T> = core::result::Result<T, SchedulerError>;

/// Scheduler-level errors
///
/// Scheduling a task is the only fallible operation; unscheduling and
/// dispatch never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The task table is full; the request was dropped.
    CapacityExhausted,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::CapacityExhausted => write!(f, "task table capacity exhausted"),
        }
    }
}
