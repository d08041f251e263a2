//! Schedule quality metrics (KPIs).
//!
//! Computes fairness and load indicators from a placed schedule.
//! Skipped matches are ignored.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Slot count | Highest used slot + 1 |
//! | Last end | Latest match end time |
//! | Field load | Matches per field |
//! | Average rest | Per team, mean gap between consecutive slots |
//! | Rest spread | max(avg rest) - min(avg rest) |
//! | Referee workload | Matches per referee |
//! | Workload spread | max(workload) - min(workload) |

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::fairness::TeamScheduleState;
use crate::models::{MatchStatus, PlacedMatch};

/// Schedule fairness and load indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Number of slots spanned (highest slot + 1).
    pub slot_count: usize,
    /// Latest end time.
    pub last_end: Option<NaiveDateTime>,
    /// Matches per field.
    pub matches_per_field: BTreeMap<u32, usize>,
    /// Average rest per team, in slots.
    pub avg_rest_by_team: BTreeMap<String, f64>,
    /// Spread of average rest across teams.
    pub rest_spread: f64,
    /// Matches per referee.
    pub referee_workload: BTreeMap<u32, usize>,
    /// Spread of referee workload.
    pub workload_spread: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(matches: &[PlacedMatch]) -> Self {
        let counted: Vec<&PlacedMatch> = matches
            .iter()
            .filter(|m| m.status != MatchStatus::Skipped)
            .collect();

        let slot_count = counted.iter().map(|m| m.slot + 1).max().unwrap_or(0);
        let last_end = counted.iter().filter_map(|m| m.end).max();

        let mut matches_per_field = BTreeMap::new();
        let mut team_slots: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut referee_workload = BTreeMap::new();
        for m in &counted {
            *matches_per_field.entry(m.field).or_insert(0) += 1;
            for team in m.pairing.teams() {
                team_slots.entry(team.to_string()).or_default().push(m.slot);
            }
            if let Some(r) = m.referee {
                *referee_workload.entry(r).or_insert(0) += 1;
            }
        }

        let avg_rest_by_team: BTreeMap<String, f64> = team_slots
            .into_iter()
            .map(|(team, slots)| (team, TeamScheduleState::from_slots(slots).average_rest()))
            .collect();

        let rest_spread = spread(avg_rest_by_team.values().copied());
        let workload_spread = match (
            referee_workload.values().min(),
            referee_workload.values().max(),
        ) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0,
        };

        Self {
            slot_count,
            last_end,
            matches_per_field,
            avg_rest_by_team,
            rest_spread,
            referee_workload,
            workload_spread,
        }
    }

    /// Whether the schedule meets the given fairness thresholds.
    pub fn meets_thresholds(&self, max_rest_spread: f64, max_workload_spread: usize) -> bool {
        self.rest_spread <= max_rest_spread && self.workload_spread <= max_workload_spread
    }
}

fn spread(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() {
        hi - lo
    } else {
        0.0
    }
}
