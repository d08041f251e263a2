//! Group-phase scheduler.
//!
//! # Algorithm
//!
//! 1. Validate configuration (field count, timing, team ids).
//! 2. Optionally shuffle each group with a seeded RNG.
//! 3. Generate every group's pairings with the configured pattern.
//! 4. Interleave groups by (round, group order, index in round).
//! 5. Place each pairing with the fairness-aware placement grid.
//!
//! The run is atomic: either every match is placed or an error is
//! returned with no partial schedule.
//!
//! # Complexity
//! O(m * (w + h) * log n) where m = matches, w = slots scanned to the
//! first legal one, h = search horizon, n = teams.

use chrono::NaiveDateTime;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::fairness::FairnessTracker;
use super::pairing::{generate_group, Bye, PairingPattern};
use super::placement::{PlacementGrid, PlacementRules, SlotTiming};
use crate::error::{Result, ScheduleError};
use crate::models::{MatchPairing, PlacedMatch, Team};
use crate::validation::{validate_teams, validate_timing};

/// A labelled group of teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    pub teams: Vec<Team>,
}

impl Group {
    /// Creates a group.
    pub fn new(label: impl Into<String>, teams: Vec<Team>) -> Self {
        Self {
            label: label.into(),
            teams,
        }
    }
}

/// Group-phase scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    /// Groups in scheduling order.
    pub groups: Vec<Group>,
    /// Number of fields played in parallel.
    pub number_of_fields: i32,
    /// Match length (minutes).
    pub match_duration_minutes: i64,
    /// Break between consecutive slots (minutes).
    pub break_duration_minutes: i64,
    /// Minimum slot gap between two matches of the same team.
    pub min_rest_slots: usize,
    /// Kickoff of slot 0.
    pub start_time: NaiveDateTime,
    /// Pairing order.
    pub pattern: PairingPattern,
    /// Slots past the first legal one scored by the fairness tie-break.
    pub search_horizon_slots: usize,
    /// Placements at or beyond this slot fail. `None` = unbounded.
    pub slot_limit: Option<usize>,
    /// Seed for shuffling team order inside each group.
    pub shuffle_seed: Option<u64>,
}

impl Default for ScheduleRequest {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            number_of_fields: 1,
            match_duration_minutes: 10,
            break_duration_minutes: 2,
            min_rest_slots: 1,
            start_time: NaiveDateTime::default(),
            pattern: PairingPattern::RoundRobin,
            search_horizon_slots: 1,
            slot_limit: None,
            shuffle_seed: None,
        }
    }
}

impl ScheduleRequest {
    /// Creates a request for the given groups.
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    /// Groups teams by their group label, in first-seen order.
    ///
    /// Ungrouped teams form a group with an empty label.
    pub fn from_teams(teams: &[Team]) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        for team in teams {
            let label = team.group.clone().unwrap_or_default();
            match groups.iter_mut().find(|g| g.label == label) {
                Some(group) => group.teams.push(team.clone()),
                None => groups.push(Group::new(label, vec![team.clone()])),
            }
        }
        Self::new(groups)
    }

    /// Sets the number of fields.
    pub fn with_fields(mut self, fields: i32) -> Self {
        self.number_of_fields = fields;
        self
    }

    /// Sets match and break durations (minutes).
    pub fn with_timing(mut self, match_minutes: i64, break_minutes: i64) -> Self {
        self.match_duration_minutes = match_minutes;
        self.break_duration_minutes = break_minutes;
        self
    }

    /// Sets the minimum rest in slots.
    pub fn with_min_rest(mut self, slots: usize) -> Self {
        self.min_rest_slots = slots;
        self
    }

    /// Sets the kickoff of slot 0.
    pub fn with_start_time(mut self, start: NaiveDateTime) -> Self {
        self.start_time = start;
        self
    }

    /// Sets the pairing pattern.
    pub fn with_pattern(mut self, pattern: PairingPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Sets the fairness search horizon.
    pub fn with_search_horizon(mut self, slots: usize) -> Self {
        self.search_horizon_slots = slots;
        self
    }

    /// Bounds the slot search.
    pub fn with_slot_limit(mut self, limit: usize) -> Self {
        self.slot_limit = Some(limit);
        self
    }

    /// Shuffles team order inside groups with a fixed seed.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// All teams across groups, in group order.
    pub fn teams(&self) -> Vec<Team> {
        self.groups.iter().flat_map(|g| g.teams.iter().cloned()).collect()
    }

    pub(crate) fn field_count(&self) -> Result<u32> {
        if self.number_of_fields <= 0 {
            return Err(ScheduleError::InvalidFieldCount(self.number_of_fields));
        }
        Ok(self.number_of_fields as u32)
    }
}

/// Output of a group-phase run.
#[derive(Debug, Clone)]
pub struct GroupPhasePlan {
    /// Placed matches, ordered by (slot, field).
    pub matches: Vec<PlacedMatch>,
    /// BYE rounds of odd-sized groups.
    pub byes: Vec<Bye>,
    /// Final fairness spread.
    pub fairness_spread: f64,
}

/// Round-robin group-phase scheduler.
///
/// # Example
///
/// ```
/// use u_tournament::models::Team;
/// use u_tournament::scheduler::{GroupPhaseScheduler, ScheduleRequest};
///
/// let teams: Vec<Team> = (0..4).map(|i| Team::new(format!("t{i}")).with_group("A")).collect();
/// let request = ScheduleRequest::from_teams(&teams).with_fields(2);
///
/// let matches = GroupPhaseScheduler::new().schedule(&request).unwrap();
/// assert_eq!(matches.len(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupPhaseScheduler;

impl GroupPhaseScheduler {
    /// Creates a scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Schedules the group phase.
    pub fn schedule(&self, request: &ScheduleRequest) -> Result<Vec<PlacedMatch>> {
        self.plan(request).map(|plan| plan.matches)
    }

    /// Schedules the group phase and reports BYEs and the fairness spread.
    pub fn plan(&self, request: &ScheduleRequest) -> Result<GroupPhasePlan> {
        let fields = request.field_count()?;
        validate_timing(request.match_duration_minutes, request.break_duration_minutes)
            .map_err(ScheduleError::Validation)?;
        let teams = request.teams();
        validate_teams(&teams).map_err(ScheduleError::Validation)?;

        let (pairings, byes) = self.generate_pairings(request)?;

        let tracker = FairnessTracker::bind(
            teams
                .iter()
                .map(|t| (t.id.clone(), Default::default())),
        );
        let rules = PlacementRules {
            fields,
            min_rest_slots: request.min_rest_slots,
            horizon: request.search_horizon_slots,
            slot_limit: request.slot_limit,
        };
        let timing = SlotTiming {
            start: request.start_time,
            base_slot: 0,
            match_minutes: request.match_duration_minutes,
            break_minutes: request.break_duration_minutes,
        };

        let mut grid = PlacementGrid::new(rules, tracker, 0);
        let mut matches = Vec::with_capacity(pairings.len());
        let mut unplaced = Vec::new();

        for pairing in pairings {
            match grid.place(&pairing) {
                Some((field, slot)) => matches.push(PlacedMatch::new(
                    pairing,
                    field,
                    slot,
                    timing.start_of(slot),
                    request.match_duration_minutes,
                )),
                None => unplaced.push(pairing.id),
            }
        }

        if !unplaced.is_empty() {
            warn!(
                "group phase infeasible: {} of {} matches could not be placed",
                unplaced.len(),
                matches.len() + unplaced.len()
            );
            return Err(ScheduleError::Infeasible {
                placed: matches.len(),
                unplaced,
            });
        }

        matches.sort_by_key(|m| (m.slot, m.field));
        let fairness_spread = grid.tracker().global_variance();
        debug!(
            "group phase: {} matches in {} slots on {fields} field(s), fairness spread {fairness_spread:.3}",
            matches.len(),
            matches.last().map_or(0, |m| m.slot + 1),
        );

        Ok(GroupPhasePlan {
            matches,
            byes,
            fairness_spread,
        })
    }

    /// Generates all group pairings in placement order.
    pub fn generate_pairings(&self, request: &ScheduleRequest) -> Result<(Vec<MatchPairing>, Vec<Bye>)> {
        let mut rng = request.shuffle_seed.map(StdRng::seed_from_u64);
        let mut ordered: Vec<(usize, usize, MatchPairing)> = Vec::new();
        let mut byes = Vec::new();

        for (group_idx, group) in request.groups.iter().enumerate() {
            let mut teams = group.teams.clone();
            if let Some(rng) = rng.as_mut() {
                teams.shuffle(rng);
            }
            let fixtures = generate_group(&group.label, &teams, &request.pattern)?;
            ordered.extend(
                fixtures
                    .pairings
                    .into_iter()
                    .map(|p| (p.round, group_idx, p)),
            );
            byes.extend(fixtures.byes);
        }

        // Stable: keeps the in-round order of each group.
        ordered.sort_by_key(|(round, group_idx, _)| (*round, *group_idx));
        Ok((ordered.into_iter().map(|(_, _, p)| p).collect(), byes))
    }
}
