//! Error and diagnostic types returned by the scheduling engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Severity of an [`AssignmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Surfaced to the operator but does not fail the run.
    Warning,
    /// At least one of these present forces `success = false`.
    Error,
}

/// A single unfilled or degraded assignment, recorded instead of aborting the run.
///
/// The engine never panics or returns early on a scheduling failure; it records
/// one of these per skipped slot and keeps going. See the crate-level docs for
/// the full propagation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentError {
    pub task_type: String,
    pub date: NaiveDate,
    pub reason: String,
    pub severity: Severity,
}

impl AssignmentError {
    pub fn error(task_type: impl Into<String>, date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            date,
            reason: reason.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(task_type: impl Into<String>, date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            date,
            reason: reason.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Kind of assignment a [`crate::scoring::reverse_assignment_penalty`] call is reversing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReversalKind {
    YTask,
    Closing,
}

/// Errors raised by programmer-facing API misuse, as opposed to domain-level
/// scheduling failures (which are [`AssignmentError`] entries, not this type).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulingInputError {
    #[error("scheduling range end {end} is before start {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("duplicate worker id: {0}")]
    DuplicateWorkerId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn error_constructor_sets_severity() {
        let e = AssignmentError::error("Supervisor", d(2025, 1, 6), "no qualified workers");
        assert_eq!(e.severity, Severity::Error);
        assert!(e.is_error());
    }

    #[test]
    fn warning_constructor_sets_severity() {
        let e = AssignmentError::warning("Weekend_Closer", d(2025, 1, 2), "could not fill slots");
        assert_eq!(e.severity, Severity::Warning);
        assert!(!e.is_error());
    }

    #[test]
    fn inverted_range_display() {
        let e = SchedulingInputError::InvertedRange {
            start: d(2025, 1, 10),
            end: d(2025, 1, 1),
        };
        assert!(e.to_string().contains("is before start"));
    }
}
