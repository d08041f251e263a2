//! Schedule remediation.
//!
//! Routines that react to schedule events (a skipped match, uneven
//! referee or field load) and propose changes. None of them mutate the
//! schedule; each returns a `RemediationResult` whose `changes` the caller
//! applies, for example with [`apply_changes`].
//!
//! | Routine | Touches |
//! |---------|---------|
//! | [`auto_reassign_referees`] | referee |
//! | [`redistribute_after_skip`] | referee, one match |
//! | [`balance_workloads`] | referee |
//! | [`redistribute_fields`] | field |

mod fields;
mod referees;

pub use fields::redistribute_fields;
pub use referees::{auto_reassign_referees, balance_workloads, redistribute_after_skip};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::models::{ChangedField, MatchChange, PlacedMatch, ScheduleConflict};

/// Outcome of a remediation routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationResult {
    /// Proposed deltas, in schedule order.
    pub changes: Vec<MatchChange>,
    /// Whether any change was proposed.
    pub success: bool,
    /// Human-readable summary.
    pub summary: String,
    /// Conflicts the proposed schedule still has.
    pub unresolved: Vec<ScheduleConflict>,
}

impl RemediationResult {
    pub(crate) fn nothing(summary: impl Into<String>) -> Self {
        Self {
            changes: Vec::new(),
            success: false,
            summary: summary.into(),
            unresolved: Vec::new(),
        }
    }

    pub(crate) fn with_changes(changes: Vec<MatchChange>, summary: impl Into<String>) -> Self {
        Self {
            success: !changes.is_empty(),
            changes,
            summary: summary.into(),
            unresolved: Vec::new(),
        }
    }

    pub(crate) fn with_unresolved(mut self, unresolved: Vec<ScheduleConflict>) -> Self {
        self.unresolved = unresolved;
        self
    }
}

/// Returns a copy of `matches` with `changes` applied in order.
///
/// # Errors
/// `UnknownMatch` for a change whose match is not in the schedule.
pub fn apply_changes(matches: &[PlacedMatch], changes: &[MatchChange]) -> Result<Vec<PlacedMatch>> {
    let mut out = matches.to_vec();
    for change in changes {
        let target = out
            .iter_mut()
            .find(|m| m.id() == change.match_id)
            .ok_or_else(|| ScheduleError::UnknownMatch(change.match_id.clone()))?;
        match change.field {
            ChangedField::Referee => target.referee = change.new_value,
            ChangedField::Field => {
                if let Some(field) = change.new_value {
                    target.field = field;
                }
            }
        }
    }
    Ok(out)
}

/// Changes that turn `before` into `after`, in `after` order.
pub(crate) fn diff_referees(before: &[PlacedMatch], after: &[PlacedMatch]) -> Vec<MatchChange> {
    before
        .iter()
        .zip(after)
        .filter(|(b, a)| b.referee != a.referee)
        .map(|(b, a)| MatchChange::referee(a.id(), b.referee, a.referee))
        .collect()
}
