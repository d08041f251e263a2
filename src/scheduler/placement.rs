//! (field, slot) placement shared by the group and playoff schedulers.
//!
//! # Algorithm
//!
//! For each pairing, scan slots upward from the earliest slot that still
//! has a free field. A slot is a candidate when it has a free field and
//! both teams are rest-legal there. Candidates are scored by the fairness
//! spread that placing the match would produce; the first legal slot and
//! the next `horizon` slots are scored. The smallest spread wins, ties go
//! to the earliest slot. Within a slot, fields fill lowest-first.
//!
//! A slot is never freed, so per-slot occupancy is a single counter.

use chrono::{Duration, NaiveDateTime};
use log::trace;

use super::fairness::FairnessTracker;
use crate::models::MatchPairing;

const SPREAD_EPSILON: f64 = 1e-9;

/// Maps slot indices to kickoff times.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotTiming {
    /// Kickoff of `base_slot`.
    pub start: NaiveDateTime,
    pub base_slot: usize,
    pub match_minutes: i64,
    pub break_minutes: i64,
}

impl SlotTiming {
    /// Kickoff of a slot at or after `base_slot`.
    pub fn start_of(&self, slot: usize) -> NaiveDateTime {
        let offset = slot.saturating_sub(self.base_slot) as i64;
        self.start + Duration::minutes(offset * (self.match_minutes + self.break_minutes))
    }
}

/// Placement limits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlacementRules {
    pub fields: u32,
    pub min_rest_slots: usize,
    pub horizon: usize,
    pub slot_limit: Option<usize>,
}

/// Occupancy grid plus fairness state.
#[derive(Debug)]
pub(crate) struct PlacementGrid {
    rules: PlacementRules,
    occupied: Vec<u32>,
    first_open: usize,
    tracker: FairnessTracker,
}

impl PlacementGrid {
    pub fn new(rules: PlacementRules, tracker: FairnessTracker, min_slot: usize) -> Self {
        Self {
            rules,
            occupied: Vec::new(),
            first_open: min_slot,
            tracker,
        }
    }

    /// Raises the lowest slot new placements may use.
    pub fn set_min_slot(&mut self, min_slot: usize) {
        self.first_open = self.first_open.max(min_slot);
        self.advance_first_open();
    }

    pub fn tracker(&self) -> &FairnessTracker {
        &self.tracker
    }

    /// Chooses and commits a cell for `pairing`. `None` when no legal slot
    /// exists below the slot limit.
    pub fn place(&mut self, pairing: &MatchPairing) -> Option<(u32, usize)> {
        let slot = self.best_slot(&pairing.home, &pairing.away)?;

        if self.occupied.len() <= slot {
            self.occupied.resize(slot + 1, 0);
        }
        self.occupied[slot] += 1;
        let field = self.occupied[slot];

        self.tracker.record_assignment(&pairing.home, slot);
        self.tracker.record_assignment(&pairing.away, slot);
        self.advance_first_open();

        trace!(
            "placed {} ({} vs {}) at field {field}, slot {slot}; spread {:.3}",
            pairing.id,
            pairing.home,
            pairing.away,
            self.tracker.global_variance()
        );
        Some((field, slot))
    }

    fn best_slot(&self, home: &str, away: &str) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        let mut first_legal: Option<usize> = None;
        let mut slot = self.first_open;

        loop {
            if self.rules.slot_limit.is_some_and(|limit| slot >= limit) {
                break;
            }
            if first_legal.is_some_and(|first| slot > first + self.rules.horizon) {
                break;
            }

            if self.has_free_field(slot)
                && self.tracker.is_rest_legal(home, slot, self.rules.min_rest_slots)
                && self.tracker.is_rest_legal(away, slot, self.rules.min_rest_slots)
            {
                first_legal.get_or_insert(slot);
                let spread = self.tracker.projected_spread(&[(home, slot), (away, slot)]);
                match best {
                    Some((b, _)) if spread >= b - SPREAD_EPSILON => {}
                    _ => best = Some((spread, slot)),
                }
            }
            slot += 1;
        }

        best.map(|(_, slot)| slot)
    }

    fn has_free_field(&self, slot: usize) -> bool {
        self.occupied.get(slot).copied().unwrap_or(0) < self.rules.fields
    }

    fn advance_first_open(&mut self) {
        while !self.has_free_field(self.first_open) {
            self.first_open += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TeamScheduleState;
    use chrono::NaiveDate;

    fn rules(fields: u32, min_rest: usize) -> PlacementRules {
        PlacementRules {
            fields,
            min_rest_slots: min_rest,
            horizon: 1,
            slot_limit: None,
        }
    }

    #[test]
    fn test_slot_timing() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        let timing = SlotTiming {
            start,
            base_slot: 10,
            match_minutes: 12,
            break_minutes: 3,
        };
        assert_eq!(timing.start_of(10), start);
        assert_eq!(timing.start_of(12), start + Duration::minutes(30));
    }

    #[test]
    fn test_fields_fill_lowest_first() {
        let mut grid = PlacementGrid::new(rules(2, 1), FairnessTracker::new(), 0);
        assert_eq!(grid.place(&MatchPairing::new("1", "a", "b")), Some((1, 0)));
        assert_eq!(grid.place(&MatchPairing::new("2", "c", "d")), Some((2, 0)));
        assert_eq!(grid.place(&MatchPairing::new("3", "e", "f")), Some((1, 1)));
    }

    #[test]
    fn test_team_never_twice_in_slot() {
        let mut grid = PlacementGrid::new(rules(4, 0), FairnessTracker::new(), 0);
        assert_eq!(grid.place(&MatchPairing::new("1", "a", "b")), Some((1, 0)));
        let (_, slot) = grid.place(&MatchPairing::new("2", "a", "c")).unwrap();
        assert_eq!(slot, 1);
    }

    #[test]
    fn test_min_rest_respected() {
        let mut grid = PlacementGrid::new(rules(4, 3), FairnessTracker::new(), 0);
        grid.place(&MatchPairing::new("1", "a", "b"));
        let (_, slot) = grid.place(&MatchPairing::new("2", "a", "c")).unwrap();
        assert!(slot >= 3);
    }

    #[test]
    fn test_min_slot() {
        let mut grid = PlacementGrid::new(rules(1, 1), FairnessTracker::new(), 5);
        assert_eq!(grid.place(&MatchPairing::new("1", "a", "b")), Some((1, 5)));
        grid.set_min_slot(9);
        assert_eq!(grid.place(&MatchPairing::new("2", "c", "d")), Some((1, 9)));
    }

    #[test]
    fn test_slot_limit_fails() {
        let mut r = rules(1, 1);
        r.slot_limit = Some(1);
        let mut grid = PlacementGrid::new(r, FairnessTracker::new(), 0);
        assert!(grid.place(&MatchPairing::new("1", "a", "b")).is_some());
        assert!(grid.place(&MatchPairing::new("2", "c", "d")).is_none());
    }

    #[test]
    fn test_fairness_prefers_lower_spread() {
        // a: avg 1, b: avg 6 (not playing), c: avg 2
        let tracker = FairnessTracker::bind(vec![
            ("a".to_string(), TeamScheduleState::from_slots(vec![0, 1])),
            ("b".to_string(), TeamScheduleState::from_slots(vec![0, 6])),
            ("c".to_string(), TeamScheduleState::from_slots(vec![0, 2])),
        ]);
        let mut grid = PlacementGrid::new(rules(1, 1), tracker, 3);
        // Slot 3: a→1.5, c→1.5 → spread 4.5
        // Slot 4: a→2.0, c→2.0 → spread 4.0
        assert_eq!(grid.place(&MatchPairing::new("1", "a", "c")), Some((1, 4)));
    }
}
