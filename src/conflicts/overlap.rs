//! Time-overlap detectors.

use chrono::NaiveDateTime;

use super::DetectionConfig;
use crate::models::{display_name, ConflictContext, ConflictKind, PlacedMatch, ScheduleConflict, Team};

struct Window<'a> {
    m: &'a PlacedMatch,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Window<'_> {
    fn overlaps(&self, other: &Window<'_>) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Active matches as windows, ordered by start then id.
fn active_windows<'a>(
    matches: impl Iterator<Item = &'a PlacedMatch>,
    config: &DetectionConfig,
) -> Vec<Window<'a>> {
    let mut windows: Vec<Window<'a>> = matches
        .filter(|m| m.is_active())
        .filter_map(|m| {
            m.window(config.match_duration_minutes)
                .map(|(start, end)| Window { m, start, end })
        })
        .collect();
    windows.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.m.id().cmp(b.m.id())));
    windows
}

/// Calls `f` for every overlapping pair. Windows must be sorted by start.
fn for_each_overlap<'a>(windows: &[Window<'a>], mut f: impl FnMut(&'a PlacedMatch, &'a PlacedMatch)) {
    for (i, a) in windows.iter().enumerate() {
        for b in &windows[i + 1..] {
            if b.start >= a.end {
                break;
            }
            if a.overlaps(b) {
                f(a.m, b.m);
            }
        }
    }
}

/// One error per shared team of every overlapping pair.
pub fn detect_team_double_bookings(
    matches: &[PlacedMatch],
    teams: &[Team],
    config: &DetectionConfig,
) -> Vec<ScheduleConflict> {
    let windows = active_windows(matches.iter(), config);
    let mut conflicts = Vec::new();
    for_each_overlap(&windows, |a, b| {
        let [home, away] = a.pairing.teams();
        let shared = if home == away { vec![home] } else { vec![home, away] };
        for team in shared.into_iter().filter(|t| b.involves(t)) {
            conflicts.push(ScheduleConflict::new(
                ConflictKind::TeamDoubleBooking,
                &[a.id(), b.id()],
                Some(ConflictContext::Team(team.to_string())),
                format!(
                    "{} is playing {} and {} at overlapping times",
                    display_name(teams, team),
                    a.id(),
                    b.id()
                ),
            ));
        }
    });
    conflicts
}

/// One error per overlapping pair sharing an assigned referee.
pub fn detect_referee_double_bookings(
    matches: &[PlacedMatch],
    config: &DetectionConfig,
) -> Vec<ScheduleConflict> {
    let windows = active_windows(matches.iter().filter(|m| m.referee.is_some()), config);
    let mut conflicts = Vec::new();
    for_each_overlap(&windows, |a, b| {
        if let (Some(ra), Some(rb)) = (a.referee, b.referee) {
            if ra == rb {
                conflicts.push(ScheduleConflict::new(
                    ConflictKind::RefereeDoubleBooking,
                    &[a.id(), b.id()],
                    Some(ConflictContext::Referee(ra)),
                    format!("Referee {ra} is assigned to {} and {} at overlapping times", a.id(), b.id()),
                ));
            }
        }
    });
    conflicts
}

/// One error per overlapping pair on the same field.
pub fn detect_field_overlaps(matches: &[PlacedMatch], config: &DetectionConfig) -> Vec<ScheduleConflict> {
    let windows = active_windows(matches.iter(), config);
    let mut conflicts = Vec::new();
    for_each_overlap(&windows, |a, b| {
        if a.field == b.field {
            conflicts.push(ScheduleConflict::new(
                ConflictKind::FieldOverlap,
                &[a.id(), b.id()],
                Some(ConflictContext::Field(a.field)),
                format!("Field {} hosts {} and {} at overlapping times", a.field, a.id(), b.id()),
            ));
        }
    });
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchPairing, MatchStatus};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    fn m(id: &str, home: &str, away: &str, field: u32, start: NaiveDateTime) -> PlacedMatch {
        PlacedMatch::new(MatchPairing::new(id, home, away), field, 0, start, 10)
    }

    fn config() -> DetectionConfig {
        DetectionConfig::new(10)
    }

    #[test]
    fn test_team_conflict_uses_team_name() {
        let teams = vec![Team::new("team-a").with_name("Ajax")];
        let matches = vec![
            m("M1", "team-a", "team-b", 1, at(10, 0)),
            m("M2", "team-c", "team-a", 2, at(10, 5)),
        ];
        let conflicts = detect_team_double_bookings(&matches, &teams, &config());
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].message.starts_with("Ajax"));
        assert_eq!(conflicts[0].context, Some(ConflictContext::Team("team-a".into())));
    }

    #[test]
    fn test_rematch_reports_each_team() {
        let matches = vec![
            m("M1", "a", "b", 1, at(10, 0)),
            m("M2", "b", "a", 2, at(10, 0)),
        ];
        let conflicts = detect_team_double_bookings(&matches, &[], &config());
        let ids: Vec<&str> = conflicts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["team_double_booking|M1|M2|a", "team_double_booking|M1|M2|b"]);
    }

    #[test]
    fn test_symmetric_ids() {
        let a = m("M9", "x", "y", 1, at(10, 0));
        let b = m("M1", "x", "z", 1, at(10, 0));
        let forward = detect_field_overlaps(&[a.clone(), b.clone()], &config());
        let backward = detect_field_overlaps(&[b, a], &config());
        assert_eq!(forward[0].id, "field_overlap|M1|M9");
        assert_eq!(forward[0].id, backward[0].id);
    }

    #[test]
    fn test_inactive_and_unscheduled_ignored() {
        let mut unscheduled = m("M3", "a", "d", 1, at(10, 0));
        unscheduled.start = None;
        let matches = vec![
            m("M1", "a", "b", 1, at(10, 0)),
            m("M2", "a", "c", 1, at(10, 0)).with_status(MatchStatus::Finished),
            unscheduled,
            m("M4", "a", "e", 1, at(10, 0)).with_status(MatchStatus::Skipped),
        ];
        assert!(detect_team_double_bookings(&matches, &[], &config()).is_empty());
        assert!(detect_field_overlaps(&matches, &config()).is_empty());
    }

    #[test]
    fn test_referee_double_booking() {
        let matches = vec![
            m("M1", "a", "b", 1, at(10, 0)).with_referee(2),
            m("M2", "c", "d", 2, at(10, 9)).with_referee(2),
            m("M3", "e", "f", 3, at(10, 9)).with_referee(3),
            m("M4", "g", "h", 4, at(10, 9)),
        ];
        let conflicts = detect_referee_double_bookings(&matches, &config());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "referee_double_booking|M1|M2");
        assert_eq!(conflicts[0].context, Some(ConflictContext::Referee(2)));
    }

    #[test]
    fn test_longer_window_from_config() {
        let matches = vec![
            m("M1", "a", "b", 1, at(10, 0)),
            m("M2", "c", "d", 1, at(10, 12)),
        ];
        assert!(detect_field_overlaps(&matches, &config()).is_empty());
        assert_eq!(detect_field_overlaps(&matches, &DetectionConfig::new(15)).len(), 1);
    }

    #[test]
    fn test_sweep_finds_non_adjacent_overlap() {
        // M1 is long enough to overlap M3 even though M2 sits between them.
        let matches = vec![
            m("M1", "a", "b", 1, at(10, 0)),
            m("M2", "c", "d", 2, at(10, 2)),
            m("M3", "e", "f", 1, at(10, 4)),
        ];
        let conflicts = detect_field_overlaps(&matches, &config());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].match_ids, vec!["M1".to_string(), "M3".to_string()]);
    }
}
