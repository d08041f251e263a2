//! Schedule edits and remediation deltas.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::MatchStatus;

/// Which attribute of a match a remediation change touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Referee,
    Field,
}

/// One delta produced by a remediation routine.
///
/// Remediation never mutates a schedule; the caller applies these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchChange {
    /// Affected match.
    pub match_id: String,
    /// Affected attribute.
    pub field: ChangedField,
    /// Value before the change.
    pub old_value: Option<u32>,
    /// Value after the change.
    pub new_value: Option<u32>,
}

impl MatchChange {
    /// A referee reassignment.
    pub fn referee(match_id: impl Into<String>, old: Option<u32>, new: Option<u32>) -> Self {
        Self {
            match_id: match_id.into(),
            field: ChangedField::Referee,
            old_value: old,
            new_value: new,
        }
    }

    /// A field move.
    pub fn field(match_id: impl Into<String>, old: u32, new: u32) -> Self {
        Self {
            match_id: match_id.into(),
            field: ChangedField::Field,
            old_value: Some(old),
            new_value: Some(new),
        }
    }
}

/// A proposed single-attribute edit, for what-if validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposedChange {
    /// Move to a new kickoff (or unschedule).
    Start(Option<NaiveDateTime>),
    /// Move to another field.
    Field(u32),
    /// Assign or clear the referee.
    Referee(Option<u32>),
    /// Change status.
    Status(MatchStatus),
}

/// A proposed edit to one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEdit {
    pub match_id: String,
    pub change: ProposedChange,
}

impl MatchEdit {
    /// Creates an edit.
    pub fn new(match_id: impl Into<String>, change: ProposedChange) -> Self {
        Self {
            match_id: match_id.into(),
            change,
        }
    }
}
