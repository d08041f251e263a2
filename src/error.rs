//! Crate error type.
//!
//! Configuration errors and infeasibility abort an operation with no
//! partial output. Remediation routines that find nothing to do are not
//! errors; they report `success = false` instead.

use thiserror::Error;

use crate::models::RefereeMode;
use crate::validation::ValidationError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors raised by scheduling, referee assignment, and remediation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Field count below one.
    #[error("number of fields must be at least 1, got {0}")]
    InvalidFieldCount(i32),

    /// Referee pool does not fit the assignment mode.
    #[error("referee pool of {pool_size} is invalid for {mode:?} mode: {reason}")]
    InvalidRefereePool {
        mode: RefereeMode,
        pool_size: u32,
        reason: String,
    },

    /// Pairing pattern cannot be parsed or does not fit a group.
    #[error("invalid pairing pattern: {0}")]
    InvalidPattern(String),

    /// Not every match could be placed within the slot limit.
    #[error("could not place all matches: {placed} placed, {} unplaced", unplaced.len())]
    Infeasible {
        placed: usize,
        unplaced: Vec<String>,
    },

    /// A change or event references a match id that is not in the schedule.
    #[error("unknown match id: {0}")]
    UnknownMatch(String),

    /// Structural input problems, all of them.
    #[error("invalid input: {} problem(s)", .0.len())]
    Validation(Vec<ValidationError>),
}

impl ScheduleError {
    /// Whether the caller can retry after relaxing constraints.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScheduleError::Infeasible { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = ScheduleError::InvalidFieldCount(0);
        assert_eq!(e.to_string(), "number of fields must be at least 1, got 0");

        let e = ScheduleError::Infeasible {
            placed: 10,
            unplaced: vec!["A-R1-M1".into(), "A-R1-M2".into()],
        };
        assert_eq!(e.to_string(), "could not place all matches: 10 placed, 2 unplaced");
    }

    #[test]
    fn test_recoverable() {
        assert!(ScheduleError::Infeasible {
            placed: 0,
            unplaced: vec![]
        }
        .is_recoverable());
        assert!(!ScheduleError::InvalidFieldCount(-1).is_recoverable());
        assert!(!ScheduleError::UnknownMatch("x".into()).is_recoverable());
    }
}
