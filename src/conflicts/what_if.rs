//! What-if validation of a proposed edit.
//!
//! The edit is applied to a copy of the schedule; the input is never
//! mutated.

use super::{detect_all, DetectionConfig};
use crate::error::{Result, ScheduleError};
use crate::models::{MatchEdit, PlacedMatch, ProposedChange, ScheduleConflict, Team};

/// Returns a copy of `matches` with `edit` applied.
///
/// # Errors
/// `UnknownMatch` when the edited match is not in the schedule.
pub fn preview_change(
    matches: &[PlacedMatch],
    edit: &MatchEdit,
    config: &DetectionConfig,
) -> Result<Vec<PlacedMatch>> {
    let mut preview = matches.to_vec();
    let target = preview
        .iter_mut()
        .find(|m| m.id() == edit.match_id)
        .ok_or_else(|| ScheduleError::UnknownMatch(edit.match_id.clone()))?;

    match &edit.change {
        ProposedChange::Start(start) => target.reschedule(*start, config.match_duration_minutes),
        ProposedChange::Field(field) => target.field = *field,
        ProposedChange::Referee(referee) => target.referee = *referee,
        ProposedChange::Status(status) => target.status = *status,
    }
    Ok(preview)
}

/// Conflicts involving the edited match after the edit.
///
/// An empty result means the edit is safe to commit.
pub fn validate_change(
    matches: &[PlacedMatch],
    teams: &[Team],
    edit: &MatchEdit,
    config: &DetectionConfig,
) -> Result<Vec<ScheduleConflict>> {
    let preview = preview_change(matches, edit, config)?;
    Ok(detect_all(&preview, teams, config)
        .into_iter()
        .filter(|c| c.involves(&edit.match_id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConflictKind, MatchPairing, MatchStatus};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    fn schedule() -> Vec<PlacedMatch> {
        vec![
            PlacedMatch::new(MatchPairing::new("M1", "a", "b"), 1, 0, at(10, 0), 10).with_referee(1),
            PlacedMatch::new(MatchPairing::new("M2", "c", "d"), 2, 0, at(10, 0), 10).with_referee(2),
            PlacedMatch::new(MatchPairing::new("M3", "a", "c"), 1, 1, at(10, 12), 10).with_referee(1),
        ]
    }

    #[test]
    fn test_field_move_conflict() {
        let matches = schedule();
        let edit = MatchEdit::new("M2", ProposedChange::Field(1));
        let conflicts = validate_change(&matches, &[], &edit, &DetectionConfig::new(10)).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::FieldOverlap);
        // Input untouched.
        assert_eq!(matches[1].field, 2);
    }

    #[test]
    fn test_reschedule_into_team_conflict() {
        let edit = MatchEdit::new("M3", ProposedChange::Start(Some(at(10, 5))));
        let conflicts =
            validate_change(&schedule(), &[], &edit, &DetectionConfig::new(10)).unwrap();
        let kinds: Vec<ConflictKind> = conflicts.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ConflictKind::TeamDoubleBooking));
        assert!(kinds.contains(&ConflictKind::RefereeDoubleBooking));
        assert!(conflicts.iter().all(|c| c.involves("M3")));
    }

    #[test]
    fn test_only_edited_match_reported() {
        let mut matches = schedule();
        // Pre-existing conflict between M1 and M2 on the referee.
        matches[1].referee = Some(1);
        let edit = MatchEdit::new("M3", ProposedChange::Referee(Some(2)));
        let conflicts = validate_change(&matches, &[], &edit, &DetectionConfig::new(10)).unwrap();
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_skipping_clears_conflicts() {
        let mut matches = schedule();
        matches[1].field = 1;
        let edit = MatchEdit::new("M2", ProposedChange::Status(MatchStatus::Skipped));
        let conflicts = validate_change(&matches, &[], &edit, &DetectionConfig::new(10)).unwrap();
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_preview_keeps_length() {
        let edit = MatchEdit::new("M1", ProposedChange::Start(Some(at(11, 0))));
        let preview = preview_change(&schedule(), &edit, &DetectionConfig::new(10)).unwrap();
        assert_eq!(preview[0].start, Some(at(11, 0)));
        assert_eq!(preview[0].end, Some(at(11, 10)));
    }

    #[test]
    fn test_unknown_match() {
        let edit = MatchEdit::new("nope", ProposedChange::Field(1));
        assert_eq!(
            validate_change(&schedule(), &[], &edit, &DetectionConfig::new(10)).unwrap_err(),
            ScheduleError::UnknownMatch("nope".into())
        );
    }
}
