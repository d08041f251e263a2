//! Placed match model.
//!
//! A placed match is a pairing bound to a field and a slot. The
//! (field, slot) pair is unique across a generated schedule.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::MatchPairing;

/// Match lifecycle status. Owned by external editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Running,
    Finished,
    Skipped,
}

/// Final or running score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// A pairing placed on a field at a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedMatch {
    /// The underlying pairing.
    pub pairing: MatchPairing,
    /// Field number (1-based).
    pub field: u32,
    /// Global slot index (0-based).
    pub slot: usize,
    /// Kickoff time. `None` = not scheduled; never conflicts.
    pub start: Option<NaiveDateTime>,
    /// End of play.
    pub end: Option<NaiveDateTime>,
    /// Referee number. `None` = unassigned.
    pub referee: Option<u32>,
    /// Score, once known.
    pub score: Option<Score>,
    /// Lifecycle status.
    pub status: MatchStatus,
}

impl PlacedMatch {
    /// Places a pairing at a field and slot with a computed time window.
    pub fn new(
        pairing: MatchPairing,
        field: u32,
        slot: usize,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Self {
        Self {
            pairing,
            field,
            slot,
            start: Some(start),
            end: Some(start + Duration::minutes(duration_minutes)),
            referee: None,
            score: None,
            status: MatchStatus::Scheduled,
        }
    }

    /// Sets the referee.
    pub fn with_referee(mut self, referee: u32) -> Self {
        self.referee = Some(referee);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    /// Match identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.pairing.id
    }

    /// Home team id.
    #[inline]
    pub fn home(&self) -> &str {
        &self.pairing.home
    }

    /// Away team id.
    #[inline]
    pub fn away(&self) -> &str {
        &self.pairing.away
    }

    /// Whether the given team plays in this match.
    #[inline]
    pub fn involves(&self, team_id: &str) -> bool {
        self.pairing.involves(team_id)
    }

    /// Scheduled and neither finished nor skipped.
    pub fn is_active(&self) -> bool {
        self.start.is_some() && !matches!(self.status, MatchStatus::Finished | MatchStatus::Skipped)
    }

    /// Half-open time window `[start, start + duration)`.
    pub fn window(&self, duration_minutes: i64) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.start
            .map(|s| (s, s + Duration::minutes(duration_minutes)))
    }

    /// Moves the match to a new kickoff, keeping its length.
    pub(crate) fn reschedule(&mut self, start: Option<NaiveDateTime>, fallback_minutes: i64) {
        let length = match (self.start, self.end) {
            (Some(s), Some(e)) => e - s,
            _ => Duration::minutes(fallback_minutes),
        };
        self.start = start;
        self.end = start.map(|s| s + length);
    }
}

/// Query helpers over a match list.
pub trait MatchList {
    /// Finds a match by id.
    fn find_match(&self, match_id: &str) -> Option<&PlacedMatch>;
    /// All matches a team plays in.
    fn matches_for_team(&self, team_id: &str) -> Vec<&PlacedMatch>;
    /// All matches assigned to a referee.
    fn matches_for_referee(&self, referee: u32) -> Vec<&PlacedMatch>;
    /// Highest slot index in use.
    fn last_slot(&self) -> Option<usize>;
    /// Latest end time.
    fn last_end(&self) -> Option<NaiveDateTime>;
}

impl MatchList for [PlacedMatch] {
    fn find_match(&self, match_id: &str) -> Option<&PlacedMatch> {
        self.iter().find(|m| m.id() == match_id)
    }

    fn matches_for_team(&self, team_id: &str) -> Vec<&PlacedMatch> {
        self.iter().filter(|m| m.involves(team_id)).collect()
    }

    fn matches_for_referee(&self, referee: u32) -> Vec<&PlacedMatch> {
        self.iter().filter(|m| m.referee == Some(referee)).collect()
    }

    fn last_slot(&self) -> Option<usize> {
        self.iter().map(|m| m.slot).max()
    }

    fn last_end(&self) -> Option<NaiveDateTime> {
        self.iter().filter_map(|m| m.end).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    fn sample() -> Vec<PlacedMatch> {
        vec![
            PlacedMatch::new(MatchPairing::new("M1", "a", "b"), 1, 0, at(10, 0), 10).with_referee(1),
            PlacedMatch::new(MatchPairing::new("M2", "c", "d"), 2, 0, at(10, 0), 10),
            PlacedMatch::new(MatchPairing::new("M3", "a", "c"), 1, 1, at(10, 12), 10).with_referee(1),
        ]
    }

    #[test]
    fn test_placed_match_window() {
        let m = &sample()[0];
        assert_eq!(m.end, Some(at(10, 10)));
        assert_eq!(m.window(15), Some((at(10, 0), at(10, 15))));
    }

    #[test]
    fn test_is_active() {
        let m = sample().remove(0);
        assert!(m.is_active());
        assert!(!m.clone().with_status(MatchStatus::Finished).is_active());
        assert!(!m.clone().with_status(MatchStatus::Skipped).is_active());
        assert!(m.clone().with_status(MatchStatus::Running).is_active());

        let mut unscheduled = m;
        unscheduled.start = None;
        assert!(!unscheduled.is_active());
    }

    #[test]
    fn test_reschedule_keeps_length() {
        let mut m = sample().remove(0);
        m.reschedule(Some(at(11, 0)), 99);
        assert_eq!(m.end, Some(at(11, 10)));
        m.reschedule(None, 99);
        assert_eq!(m.end, None);
        m.reschedule(Some(at(12, 0)), 20);
        assert_eq!(m.end, Some(at(12, 20)));
    }

    #[test]
    fn test_match_list_queries() {
        let s = sample();
        assert_eq!(s.find_match("M2").map(|m| m.field), Some(2));
        assert!(s.find_match("M9").is_none());
        assert_eq!(s.matches_for_team("a").len(), 2);
        assert_eq!(s.matches_for_referee(1).len(), 2);
        assert_eq!(s.last_slot(), Some(1));
        assert_eq!(s.last_end(), Some(at(10, 22)));
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&MatchStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }
}
