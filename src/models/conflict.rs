//! Schedule conflict model.
//!
//! Conflicts are data, not errors. `Error` severity conflicts block a safe
//! commit; `Warning` severity ones are informational.
//!
//! Conflict ids are derived from the kind plus the lexicographically sorted
//! match ids (plus the team id for team conflicts), so detecting the same
//! situation twice yields the same id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conflict classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// A team plays two overlapping matches.
    TeamDoubleBooking,
    /// A referee is assigned to two overlapping matches.
    RefereeDoubleBooking,
    /// Two overlapping matches share a field.
    FieldOverlap,
    /// A team's break between matches is shorter than required.
    BreakViolation,
}

impl ConflictKind {
    /// Stable identifier prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::TeamDoubleBooking => "team_double_booking",
            ConflictKind::RefereeDoubleBooking => "referee_double_booking",
            ConflictKind::FieldOverlap => "field_overlap",
            ConflictKind::BreakViolation => "break_violation",
        }
    }

    /// Default severity for this kind.
    pub fn severity(&self) -> Severity {
        match self {
            ConflictKind::BreakViolation => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// The entity a conflict is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictContext {
    Team(String),
    Referee(u32),
    Field(u32),
}

/// A detected schedule conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    /// Stable identifier.
    pub id: String,
    /// Conflict classification.
    pub kind: ConflictKind,
    /// Error or warning.
    pub severity: Severity,
    /// Involved match ids, sorted.
    pub match_ids: Vec<String>,
    /// Human-readable explanation.
    pub message: String,
    /// Offending team, referee, or field.
    pub context: Option<ConflictContext>,
}

/// Separates the parts of a conflict id. Generated match ids use `-`.
pub const ID_SEPARATOR: &str = "|";

impl ScheduleConflict {
    /// Creates a conflict with an id derived from kind, sorted match ids,
    /// and (for team conflicts) the team id, joined by [`ID_SEPARATOR`].
    pub fn new(
        kind: ConflictKind,
        match_ids: &[&str],
        context: Option<ConflictContext>,
        message: impl Into<String>,
    ) -> Self {
        let mut ids: Vec<String> = match_ids.iter().map(|s| s.to_string()).collect();
        ids.sort();

        let mut id = format!("{}{ID_SEPARATOR}{}", kind.as_str(), ids.join(ID_SEPARATOR));
        if let Some(ConflictContext::Team(team)) = &context {
            id.push_str(ID_SEPARATOR);
            id.push_str(team);
        }

        Self {
            id,
            kind,
            severity: kind.severity(),
            match_ids: ids,
            message: message.into(),
            context,
        }
    }

    /// Whether the conflict involves the given match.
    pub fn involves(&self, match_id: &str) -> bool {
        self.match_ids.iter().any(|m| m == match_id)
    }

    /// Whether this conflict should block committing a change.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_id_sorted() {
        let a = ScheduleConflict::new(
            ConflictKind::TeamDoubleBooking,
            &["M2", "M1"],
            Some(ConflictContext::Team("team-a".into())),
            "",
        );
        let b = ScheduleConflict::new(
            ConflictKind::TeamDoubleBooking,
            &["M1", "M2"],
            Some(ConflictContext::Team("team-a".into())),
            "",
        );
        assert_eq!(a.id, "team_double_booking|M1|M2|team-a");
        assert_eq!(a.id, b.id);
        assert_eq!(a.match_ids, vec!["M1", "M2"]);
    }

    #[test]
    fn test_conflict_id_without_team() {
        let c = ScheduleConflict::new(
            ConflictKind::FieldOverlap,
            &["M3", "M1"],
            Some(ConflictContext::Field(2)),
            "",
        );
        assert_eq!(c.id, "field_overlap|M1|M3");
        assert!(c.involves("M3"));
        assert!(!c.involves("M2"));
    }

    #[test]
    fn test_conflict_id_unambiguous_with_dashed_ids() {
        let a = ScheduleConflict::new(ConflictKind::FieldOverlap, &["A-B", "C"], None, "");
        let b = ScheduleConflict::new(ConflictKind::FieldOverlap, &["A", "B-C"], None, "");
        assert_ne!(a.id, b.id);
        assert_eq!(a.id, "field_overlap|A-B|C");
    }

    #[test]
    fn test_severity_by_kind() {
        assert_eq!(ConflictKind::FieldOverlap.severity(), Severity::Error);
        assert_eq!(ConflictKind::BreakViolation.severity(), Severity::Warning);
        let c = ScheduleConflict::new(ConflictKind::BreakViolation, &["M1", "M2"], None, "");
        assert!(!c.is_blocking());
    }
}
