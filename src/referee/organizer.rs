//! Organizer-pool referee assignment.
//!
//! Matches are processed in (slot, field) order. Referees are ranked by
//! ascending workload, then by longest rest (never worked first), then by
//! number. The strict pass takes the first referee who is free in the slot
//! and whose slot gap satisfies the cap; the relaxed pass drops the cap.
//! Skipped matches keep their referee and count for nobody.

use log::{trace, warn};
use std::collections::HashSet;

use super::is_settled;
use crate::models::{MatchStatus, PlacedMatch, RefereeConfig};

#[derive(Debug, Clone, Default)]
struct RefereeLoad {
    workload: usize,
    last_slot: Option<usize>,
    busy: HashSet<usize>,
}

impl RefereeLoad {
    fn record(&mut self, slot: usize) {
        self.workload += 1;
        self.last_slot = Some(self.last_slot.map_or(slot, |s| s.max(slot)));
        self.busy.insert(slot);
    }

    fn gap(&self, slot: usize) -> Option<usize> {
        self.last_slot.map(|last| slot.saturating_sub(last))
    }
}

/// Assigns pool referees in place. Requires `pool_size >= 1`.
pub(super) fn assign(matches: &mut [PlacedMatch], config: &RefereeConfig) {
    let pool = config.pool_size as usize;
    let mut loads = vec![RefereeLoad::default(); pool];

    let mut order: Vec<usize> = (0..matches.len())
        .filter(|&i| matches[i].status != MatchStatus::Skipped)
        .collect();
    order.sort_by_key(|&i| (matches[i].slot, matches[i].field));

    // Fixed assignments occupy their slot before any choice is made.
    let mut fixed = vec![false; matches.len()];
    for &i in &order {
        let m = &mut matches[i];
        if let Some(locked) = config.locked_referee(m.id()) {
            m.referee = Some(locked);
            fixed[i] = true;
        } else if is_settled(m) {
            fixed[i] = true;
        }
        if fixed[i] {
            if let Some(load) = m.referee.and_then(|r| pool_index(r, pool)) {
                loads[load].busy.insert(m.slot);
            }
        }
    }

    for &i in &order {
        let slot = matches[i].slot;
        if fixed[i] {
            if let Some(idx) = matches[i].referee.and_then(|r| pool_index(r, pool)) {
                loads[idx].workload += 1;
                loads[idx].last_slot = Some(loads[idx].last_slot.map_or(slot, |s| s.max(slot)));
            }
            continue;
        }

        let idx = choose(&loads, slot, config);
        loads[idx].record(slot);
        let referee = idx as u32 + 1;
        trace!("match {} (slot {slot}) -> referee {referee}", matches[i].id());
        matches[i].referee = Some(referee);
    }
}

fn pool_index(referee: u32, pool: usize) -> Option<usize> {
    let idx = (referee as usize).checked_sub(1)?;
    (idx < pool).then_some(idx)
}

/// Index of the referee for `slot`.
fn choose(loads: &[RefereeLoad], slot: usize, config: &RefereeConfig) -> usize {
    let mut ranking: Vec<usize> = (0..loads.len()).collect();
    ranking.sort_by_key(|&r| (loads[r].workload, rest_key(&loads[r]), r));

    if let Some(&r) = ranking
        .iter()
        .find(|&&r| !loads[r].busy.contains(&slot) && config.gap_allowed(loads[r].gap(slot)))
    {
        return r;
    }

    let relaxed = longest_rest(loads, (0..loads.len()).filter(|&r| !loads[r].busy.contains(&slot)));
    match relaxed {
        Some(r) => {
            warn!(
                "referee cap of {} relaxed at slot {slot}: referee {} assigned",
                config.max_consecutive_matches,
                r + 1
            );
            r
        }
        None => {
            let r = longest_rest(loads, 0..loads.len()).unwrap_or(0);
            warn!("every referee busy at slot {slot}: referee {} double-booked", r + 1);
            r
        }
    }
}

fn longest_rest(loads: &[RefereeLoad], candidates: impl Iterator<Item = usize>) -> Option<usize> {
    candidates.min_by_key(|&r| (rest_key(&loads[r]), r))
}

/// Sort key where smaller means longer rest; never-worked sorts first.
fn rest_key(load: &RefereeLoad) -> (bool, usize) {
    match load.last_slot {
        None => (false, 0),
        Some(s) => (true, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchPairing, MatchStatus};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(slot: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
            + chrono::Duration::minutes(12 * slot as i64)
    }

    fn m(id: &str, field: u32, slot: usize) -> PlacedMatch {
        let pairing = MatchPairing::new(id, format!("{id}-h"), format!("{id}-a"));
        PlacedMatch::new(pairing, field, slot, at(slot), 10)
    }

    fn workload(matches: &[PlacedMatch], referee: u32) -> usize {
        matches.iter().filter(|m| m.referee == Some(referee)).count()
    }

    #[test]
    fn test_even_workload_distinct_times() {
        let mut matches: Vec<PlacedMatch> = (0..6).map(|s| m(&format!("M{s}"), 1, s)).collect();
        assign(&mut matches, &RefereeConfig::organizer(3));

        for r in 1..=3 {
            assert_eq!(workload(&matches, r), 2);
        }
        // Round-robin order with the default cap of 2.
        let refs: Vec<u32> = matches.iter().filter_map(|m| m.referee).collect();
        assert_eq!(refs, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_no_referee_twice_in_slot() {
        let mut matches = vec![m("A", 1, 0), m("B", 2, 0), m("C", 1, 1), m("D", 2, 1)];
        assign(&mut matches, &RefereeConfig::organizer(2).with_max_consecutive(0));
        assert_ne!(matches[0].referee, matches[1].referee);
        assert_ne!(matches[2].referee, matches[3].referee);
    }

    #[test]
    fn test_cap_relaxed_with_single_referee() {
        let mut matches = vec![m("A", 1, 0), m("B", 1, 1), m("C", 1, 2)];
        assign(&mut matches, &RefereeConfig::organizer(1));
        assert!(matches.iter().all(|m| m.referee == Some(1)));
    }

    #[test]
    fn test_cap_skips_recent_referee() {
        // Referee 1 takes slot 0; at slot 1 referee 2 is the only one
        // with zero workload, and at slot 2 referee 1 has rested two slots.
        let mut matches = vec![m("A", 1, 0), m("B", 1, 1), m("C", 1, 2)];
        assign(&mut matches, &RefereeConfig::organizer(2));
        let refs: Vec<u32> = matches.iter().filter_map(|m| m.referee).collect();
        assert_eq!(refs, vec![1, 2, 1]);
    }

    #[test]
    fn test_locked_override_kept() {
        let mut matches = vec![m("A", 1, 0), m("B", 2, 0), m("C", 1, 1)];
        let config = RefereeConfig::organizer(2).with_override("A", 2);
        assign(&mut matches, &config);
        assert_eq!(matches[0].referee, Some(2));
        // Referee 2 is busy in slot 0.
        assert_eq!(matches[1].referee, Some(1));
    }

    #[test]
    fn test_finished_match_keeps_referee() {
        let mut matches = vec![
            m("A", 1, 0).with_referee(3).with_status(MatchStatus::Finished),
            m("B", 1, 1),
        ];
        assign(&mut matches, &RefereeConfig::organizer(3));
        assert_eq!(matches[0].referee, Some(3));
        assert_eq!(matches[1].referee, Some(1));
    }

    #[test]
    fn test_all_busy_still_assigns() {
        let mut matches = vec![m("A", 1, 0), m("B", 2, 0)];
        assign(&mut matches, &RefereeConfig::organizer(1));
        assert!(matches.iter().all(|m| m.referee == Some(1)));
    }

    #[test]
    fn test_skipped_match_left_alone() {
        let mut matches = vec![
            m("M0", 1, 0).with_status(MatchStatus::Skipped),
            m("M1", 1, 1),
            m("M2", 1, 2),
            m("M3", 1, 3),
        ];
        assign(&mut matches, &RefereeConfig::organizer(3));
        assert_eq!(matches[0].referee, None);
        let refs: Vec<Option<u32>> = matches[1..].iter().map(|m| m.referee).collect();
        assert_eq!(refs, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_skipped_match_keeps_prior_referee_without_load() {
        let mut matches = vec![
            m("M0", 1, 0).with_referee(1).with_status(MatchStatus::Skipped),
            m("M1", 2, 0),
        ];
        assign(&mut matches, &RefereeConfig::organizer(2));
        assert_eq!(matches[0].referee, Some(1));
        // Referee 1 is not busy in slot 0.
        assert_eq!(matches[1].referee, Some(1));
    }
}
