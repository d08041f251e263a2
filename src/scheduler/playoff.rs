//! Playoff (bracket) slot scheduler.
//!
//! Places pre-computed bracket pairings after the group phase with the
//! same legality and fairness rules. Pairings are grouped by bracket stage
//! in order of first appearance; each stage starts strictly after the last
//! slot used by the previous one.

use chrono::{Duration, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use super::fairness::{FairnessTracker, TeamScheduleState};
use super::group::ScheduleRequest;
use super::placement::{PlacementGrid, PlacementRules, SlotTiming};
use crate::error::{Result, ScheduleError};
use crate::models::{MatchList, MatchPairing, MatchStatus, PlacedMatch};
use crate::validation::{validate_pairings, validate_timing};

/// Playoff-phase scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayoffRequest {
    /// Bracket pairings in bracket order.
    pub pairings: Vec<MatchPairing>,
    /// Number of fields.
    pub number_of_fields: i32,
    /// Match length (minutes).
    pub match_duration_minutes: i64,
    /// Break between slots (minutes).
    pub break_duration_minutes: i64,
    /// Minimum slot gap between two matches of the same team.
    pub min_rest_slots: usize,
    /// First slot of the playoff phase.
    pub starting_slot: usize,
    /// Kickoff of `starting_slot`.
    pub phase_start: NaiveDateTime,
    /// Fairness search horizon in slots.
    pub search_horizon_slots: usize,
    /// Placements at or beyond this slot fail.
    pub slot_limit: Option<usize>,
    /// Slots teams already play in before this phase. Rest and fairness
    /// are checked against them.
    pub team_states: Vec<(String, TeamScheduleState)>,
}

impl Default for PlayoffRequest {
    fn default() -> Self {
        let base = ScheduleRequest::default();
        Self {
            pairings: Vec::new(),
            number_of_fields: base.number_of_fields,
            match_duration_minutes: base.match_duration_minutes,
            break_duration_minutes: base.break_duration_minutes,
            min_rest_slots: base.min_rest_slots,
            starting_slot: 0,
            phase_start: base.start_time,
            search_horizon_slots: base.search_horizon_slots,
            slot_limit: None,
            team_states: Vec::new(),
        }
    }
}

impl PlayoffRequest {
    /// Creates a request for the given pairings.
    pub fn new(pairings: Vec<MatchPairing>) -> Self {
        Self {
            pairings,
            ..Default::default()
        }
    }

    /// Continues after a scheduled group phase.
    ///
    /// The playoff starts one slot after the last group slot, and
    /// `inter_phase_break_minutes` after the last group match ends.
    /// Field count, timing, rest, and horizon carry over from `group`,
    /// as do the slots of every non-skipped group match.
    pub fn after_group_phase(
        group_matches: &[PlacedMatch],
        group: &ScheduleRequest,
        pairings: Vec<MatchPairing>,
        inter_phase_break_minutes: i64,
    ) -> Self {
        let starting_slot = group_matches.last_slot().map_or(0, |s| s + 1);
        let phase_start = group_matches
            .last_end()
            .map(|end| end + Duration::minutes(inter_phase_break_minutes))
            .unwrap_or(group.start_time);

        Self {
            pairings,
            number_of_fields: group.number_of_fields,
            match_duration_minutes: group.match_duration_minutes,
            break_duration_minutes: group.break_duration_minutes,
            min_rest_slots: group.min_rest_slots,
            starting_slot,
            phase_start,
            search_horizon_slots: group.search_horizon_slots,
            slot_limit: group.slot_limit,
            team_states: team_states_of(group_matches),
        }
    }

    /// Sets the number of fields.
    pub fn with_fields(mut self, fields: i32) -> Self {
        self.number_of_fields = fields;
        self
    }

    /// Sets the slots teams already play in.
    pub fn with_team_states(mut self, team_states: Vec<(String, TeamScheduleState)>) -> Self {
        self.team_states = team_states;
        self
    }

    /// Sets the first slot and its kickoff.
    pub fn starting_at(mut self, slot: usize, kickoff: NaiveDateTime) -> Self {
        self.starting_slot = slot;
        self.phase_start = kickoff;
        self
    }
}

/// Places bracket matches.
#[derive(Debug, Clone, Default)]
pub struct PlayoffScheduler;

impl PlayoffScheduler {
    /// Creates a scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Places every bracket pairing, stage by stage.
    pub fn schedule(&self, request: &PlayoffRequest) -> Result<Vec<PlacedMatch>> {
        if request.number_of_fields <= 0 {
            return Err(ScheduleError::InvalidFieldCount(request.number_of_fields));
        }
        validate_timing(request.match_duration_minutes, request.break_duration_minutes)
            .map_err(ScheduleError::Validation)?;
        validate_pairings(&request.pairings, None).map_err(ScheduleError::Validation)?;

        let rules = PlacementRules {
            fields: request.number_of_fields as u32,
            min_rest_slots: request.min_rest_slots,
            horizon: request.search_horizon_slots,
            slot_limit: request.slot_limit,
        };
        let timing = SlotTiming {
            start: request.phase_start,
            base_slot: request.starting_slot,
            match_minutes: request.match_duration_minutes,
            break_minutes: request.break_duration_minutes,
        };
        let tracker = FairnessTracker::bind(request.team_states.iter().cloned());
        let mut grid = PlacementGrid::new(rules, tracker, request.starting_slot);

        let mut matches = Vec::with_capacity(request.pairings.len());
        let mut unplaced = Vec::new();
        for stage in stages(&request.pairings) {
            let mut stage_last: Option<usize> = None;
            for pairing in stage {
                match grid.place(pairing) {
                    Some((field, slot)) => {
                        stage_last = Some(stage_last.map_or(slot, |s| s.max(slot)));
                        matches.push(PlacedMatch::new(
                            pairing.clone(),
                            field,
                            slot,
                            timing.start_of(slot),
                            request.match_duration_minutes,
                        ));
                    }
                    None => unplaced.push(pairing.id.clone()),
                }
            }
            if let Some(last) = stage_last {
                grid.set_min_slot(last + 1);
            }
        }

        if !unplaced.is_empty() {
            warn!("playoff phase infeasible: {} match(es) unplaced", unplaced.len());
            return Err(ScheduleError::Infeasible {
                placed: matches.len(),
                unplaced,
            });
        }

        matches.sort_by_key(|m| (m.slot, m.field));
        debug!(
            "playoff phase: {} matches from slot {}",
            matches.len(),
            request.starting_slot
        );
        Ok(matches)
    }
}

/// Per-team slots of every match that was not skipped.
fn team_states_of(matches: &[PlacedMatch]) -> Vec<(String, TeamScheduleState)> {
    let mut slots: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.status != MatchStatus::Skipped) {
        for team in m.pairing.teams() {
            slots.entry(team).or_default().push(m.slot);
        }
    }
    slots
        .into_iter()
        .map(|(team, slots)| (team.to_string(), TeamScheduleState::from_slots(slots)))
        .collect()
}

/// Groups pairings by bracket stage, in order of first appearance.
fn stages(pairings: &[MatchPairing]) -> Vec<Vec<&MatchPairing>> {
    let mut labels: Vec<Option<&str>> = Vec::new();
    let mut grouped: Vec<Vec<&MatchPairing>> = Vec::new();
    for p in pairings {
        let label = p.bracket_stage.as_deref();
        match labels.iter().position(|l| *l == label) {
            Some(idx) => grouped[idx].push(p),
            None => {
                labels.push(label);
                grouped.push(vec![p]);
            }
        }
    }
    grouped
}
