//! Minimum-break detector.

use std::collections::BTreeMap;

use super::DetectionConfig;
use crate::models::{display_name, ConflictContext, ConflictKind, PlacedMatch, ScheduleConflict, Team};

/// Warns when a team's break between consecutive matches is positive but
/// shorter than `min_break_minutes`.
///
/// Overlapping or back-to-back pairs are left to the double-booking check.
pub fn detect_break_violations(
    matches: &[PlacedMatch],
    teams: &[Team],
    config: &DetectionConfig,
) -> Vec<ScheduleConflict> {
    let mut by_team: BTreeMap<&str, Vec<&PlacedMatch>> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.is_active()) {
        let [home, away] = m.pairing.teams();
        by_team.entry(home).or_default().push(m);
        if away != home {
            by_team.entry(away).or_default().push(m);
        }
    }

    let mut conflicts = Vec::new();
    for (team, mut played) in by_team {
        played.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id().cmp(b.id())));
        for pair in played.windows(2) {
            let (Some((_, end)), Some(next_start)) =
                (pair[0].window(config.match_duration_minutes), pair[1].start)
            else {
                continue;
            };
            let gap = (next_start - end).num_minutes();
            if gap > 0 && gap < config.min_break_minutes {
                conflicts.push(ScheduleConflict::new(
                    ConflictKind::BreakViolation,
                    &[pair[0].id(), pair[1].id()],
                    Some(ConflictContext::Team(team.to_string())),
                    format!(
                        "{} has a {gap} min break between {} and {} ({} min required)",
                        display_name(teams, team),
                        pair[0].id(),
                        pair[1].id(),
                        config.min_break_minutes
                    ),
                ));
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchPairing, Severity};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    fn m(id: &str, home: &str, away: &str, start: NaiveDateTime) -> PlacedMatch {
        PlacedMatch::new(MatchPairing::new(id, home, away), 1, 0, start, 10)
    }

    #[test]
    fn test_short_break_warns() {
        let matches = vec![m("M1", "a", "b", at(10, 0)), m("M2", "a", "c", at(10, 13))];
        let config = DetectionConfig::new(10).with_min_break(5);
        let conflicts = detect_break_violations(&matches, &[], &config);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, Severity::Warning);
        assert_eq!(conflicts[0].id, "break_violation|M1|M2|a");
        assert!(conflicts[0].message.contains("3 min break"));
    }

    #[test]
    fn test_zero_and_sufficient_gap() {
        let config = DetectionConfig::new(10).with_min_break(5);
        let back_to_back = vec![m("M1", "a", "b", at(10, 0)), m("M2", "a", "c", at(10, 10))];
        assert!(detect_break_violations(&back_to_back, &[], &config).is_empty());

        let rested = vec![m("M1", "a", "b", at(10, 0)), m("M2", "a", "c", at(10, 15))];
        assert!(detect_break_violations(&rested, &[], &config).is_empty());
    }

    #[test]
    fn test_unordered_input() {
        let matches = vec![
            m("M3", "a", "d", at(11, 0)),
            m("M1", "a", "b", at(10, 0)),
            m("M2", "a", "c", at(10, 11)),
        ];
        let config = DetectionConfig::new(10).with_min_break(2);
        let conflicts = detect_break_violations(&matches, &[], &config);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].match_ids, vec!["M1".to_string(), "M2".to_string()]);
    }
}
