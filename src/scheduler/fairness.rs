//! Incremental rest-fairness tracking.
//!
//! Tracks, per team, the sorted list of slots the team plays in and its
//! average rest (mean gap between consecutive slots). The fairness spread
//! is `max(avg) - min(avg)` over all bound teams.
//!
//! # Complexity
//! - `record_assignment`: O(k + log n), k = slots of the team
//! - `projected_avg_rest`: O(1) amortized (cached per (team, slot))
//! - `global_variance`: O(1)
//! - `projected_spread`: O(log n)
//!
//! The tracker owns its rest state. The scheduler reads slots through
//! [`FairnessTracker::team_slots`] and writes only through
//! [`FairnessTracker::record_assignment`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Derived per-team placement state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScheduleState {
    /// Slots the team is placed in, ascending.
    pub slots: Vec<usize>,
}

impl TeamScheduleState {
    /// Creates a state from slots in any order.
    pub fn from_slots(mut slots: Vec<usize>) -> Self {
        slots.sort_unstable();
        Self { slots }
    }

    /// Average rest over the sorted slot list; 0 for fewer than two slots.
    ///
    /// The mean of consecutive deltas telescopes to `(last - first) / (n - 1)`.
    pub fn average_rest(&self) -> f64 {
        match (self.slots.first(), self.slots.last()) {
            (Some(&first), Some(&last)) if self.slots.len() > 1 => {
                (last - first) as f64 / (self.slots.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Most recent slot.
    pub fn last_slot(&self) -> Option<usize> {
        self.slots.last().copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct RestKey {
    avg: f64,
    team: usize,
}

impl PartialEq for RestKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RestKey {}

impl PartialOrd for RestKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RestKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.avg
            .total_cmp(&other.avg)
            .then_with(|| self.team.cmp(&other.team))
    }
}

/// Incremental fairness tracker.
///
/// # Example
/// ```
/// use u_tournament::scheduler::{FairnessTracker, TeamScheduleState};
///
/// let mut tracker = FairnessTracker::bind(vec![
///     ("a".to_string(), TeamScheduleState::from_slots(vec![0, 2])),
///     ("b".to_string(), TeamScheduleState::default()),
/// ]);
/// assert_eq!(tracker.global_variance(), 2.0);
/// assert_eq!(tracker.projected_avg_rest("a", 6), 3.0);
///
/// tracker.record_assignment("b", 1);
/// tracker.record_assignment("b", 2);
/// assert_eq!(tracker.global_variance(), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FairnessTracker {
    index: HashMap<String, usize>,
    states: Vec<TeamScheduleState>,
    averages: Vec<f64>,
    ranking: BTreeSet<RestKey>,
    spread: f64,
    projections: RefCell<Vec<HashMap<usize, f64>>>,
}

impl FairnessTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes the tracker from existing per-team states.
    ///
    /// The tracker keeps its own copy; later changes to the caller's
    /// states are not observed.
    pub fn bind<I>(team_states: I) -> Self
    where
        I: IntoIterator<Item = (String, TeamScheduleState)>,
    {
        let mut tracker = Self::new();
        for (team_id, state) in team_states {
            let idx = tracker.ensure_team(&team_id);
            tracker.ranking.remove(&RestKey {
                avg: tracker.averages[idx],
                team: idx,
            });
            tracker.states[idx] = TeamScheduleState::from_slots(state.slots);
            tracker.averages[idx] = tracker.states[idx].average_rest();
            tracker.ranking.insert(RestKey {
                avg: tracker.averages[idx],
                team: idx,
            });
        }
        tracker.refresh_spread();
        tracker
    }

    /// Registers a team with no slots. No-op if already bound.
    pub fn add_team(&mut self, team_id: &str) {
        if !self.index.contains_key(team_id) {
            self.ensure_team(team_id);
            self.refresh_spread();
        }
    }

    /// Records a real placement of `team_id` at `slot`.
    ///
    /// Invalidates every cached projection of that team.
    pub fn record_assignment(&mut self, team_id: &str, slot: usize) {
        let idx = self.ensure_team(team_id);
        let old = RestKey {
            avg: self.averages[idx],
            team: idx,
        };
        self.ranking.remove(&old);

        let slots = &mut self.states[idx].slots;
        let pos = slots.partition_point(|&s| s <= slot);
        slots.insert(pos, slot);

        self.averages[idx] = self.states[idx].average_rest();
        self.ranking.insert(RestKey {
            avg: self.averages[idx],
            team: idx,
        });
        self.projections.borrow_mut()[idx].clear();
        self.refresh_spread();
    }

    /// Average rest `team_id` would have if also placed at `slot`.
    ///
    /// Does not change rest state. Unknown teams are treated as having
    /// no slots.
    pub fn projected_avg_rest(&self, team_id: &str, slot: usize) -> f64 {
        let Some(&idx) = self.index.get(team_id) else {
            return 0.0;
        };
        if let Some(&cached) = self.projections.borrow()[idx].get(&slot) {
            return cached;
        }

        let slots = &self.states[idx].slots;
        let projected = match (slots.first(), slots.last()) {
            (Some(&first), Some(&last)) => {
                let lo = first.min(slot);
                let hi = last.max(slot);
                (hi - lo) as f64 / slots.len() as f64
            }
            _ => 0.0,
        };
        self.projections.borrow_mut()[idx].insert(slot, projected);
        projected
    }

    /// Current fairness spread: `max(avg) - min(avg)`.
    #[inline]
    pub fn global_variance(&self) -> f64 {
        self.spread
    }

    /// Spread that would result from placing every `(team, slot)` in
    /// `placements`, without changing state.
    pub fn projected_spread(&self, placements: &[(&str, usize)]) -> f64 {
        let mut changed: Vec<usize> = Vec::with_capacity(placements.len());
        let mut hi = f64::NEG_INFINITY;
        let mut lo = f64::INFINITY;

        for &(team_id, slot) in placements {
            let avg = self.projected_avg_rest(team_id, slot);
            hi = hi.max(avg);
            lo = lo.min(avg);
            if let Some(&idx) = self.index.get(team_id) {
                changed.push(idx);
            }
        }

        if let Some(key) = self.ranking.iter().rev().find(|k| !changed.contains(&k.team)) {
            hi = hi.max(key.avg);
        }
        if let Some(key) = self.ranking.iter().find(|k| !changed.contains(&k.team)) {
            lo = lo.min(key.avg);
        }

        if hi.is_finite() && lo.is_finite() {
            hi - lo
        } else {
            0.0
        }
    }

    /// Current average rest of a team.
    pub fn average_rest(&self, team_id: &str) -> f64 {
        self.index
            .get(team_id)
            .map(|&idx| self.averages[idx])
            .unwrap_or(0.0)
    }

    /// Slots a team is placed in, ascending.
    pub fn team_slots(&self, team_id: &str) -> &[usize] {
        self.index
            .get(team_id)
            .map(|&idx| self.states[idx].slots.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `team_id` may play at `slot` given a minimum slot gap.
    ///
    /// The team must not already occupy `slot`, and every placed slot
    /// must be at least `min_gap` away.
    pub fn is_rest_legal(&self, team_id: &str, slot: usize, min_gap: usize) -> bool {
        let slots = self.team_slots(team_id);
        let pos = slots.partition_point(|&s| s < slot);
        let gap_ok = |s: usize| {
            let gap = s.abs_diff(slot);
            gap != 0 && gap >= min_gap
        };
        let before = pos.checked_sub(1).map(|p| slots[p]);
        let after = slots.get(pos).copied();
        before.map_or(true, gap_ok) && after.map_or(true, gap_ok)
    }

    /// Snapshot of a team's state.
    pub fn state(&self, team_id: &str) -> Option<&TeamScheduleState> {
        self.index.get(team_id).map(|&idx| &self.states[idx])
    }

    /// Number of bound teams.
    pub fn team_count(&self) -> usize {
        self.states.len()
    }

    fn ensure_team(&mut self, team_id: &str) -> usize {
        if let Some(&idx) = self.index.get(team_id) {
            return idx;
        }
        let idx = self.states.len();
        self.index.insert(team_id.to_string(), idx);
        self.states.push(TeamScheduleState::default());
        self.averages.push(0.0);
        self.projections.borrow_mut().push(HashMap::new());
        self.ranking.insert(RestKey { avg: 0.0, team: idx });
        idx
    }

    fn refresh_spread(&mut self) {
        self.spread = match (self.ranking.first(), self.ranking.last()) {
            (Some(lo), Some(hi)) => hi.avg - lo.avg,
            _ => 0.0,
        };
    }
}
