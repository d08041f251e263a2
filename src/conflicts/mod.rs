//! Conflict detection over placed schedules.
//!
//! All detectors are pure functions over a `PlacedMatch` slice. Only active
//! matches (scheduled, neither finished nor skipped) are considered. Two
//! windows overlap when `start1 < end2 && end1 > start2`; a match ending
//! exactly when another starts is not a conflict.
//!
//! | Detector | Severity | Key |
//! |----------|----------|-----|
//! | Team double-booking | error | shared team |
//! | Referee double-booking | error | equal referee |
//! | Field overlap | error | equal field |
//! | Break violation | warning | team, consecutive matches |
//!
//! Conflict ids are built from the kind and the sorted match ids, so
//! re-running detection on the same schedule yields the same ids.

mod breaks;
mod overlap;
mod what_if;

pub use breaks::detect_break_violations;
pub use overlap::{detect_field_overlaps, detect_referee_double_bookings, detect_team_double_bookings};
pub use what_if::{preview_change, validate_change};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{PlacedMatch, ScheduleConflict, Team};
use crate::scheduler::ScheduleRequest;

/// Detection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Window length of every match (minutes).
    pub match_duration_minutes: i64,
    /// Required break between two matches of a team (minutes).
    pub min_break_minutes: i64,
    /// Run the referee double-booking check.
    pub check_referees: bool,
    /// Run the field overlap check.
    pub check_fields: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            match_duration_minutes: 10,
            min_break_minutes: 0,
            check_referees: true,
            check_fields: true,
        }
    }
}

impl DetectionConfig {
    /// Creates a config with the given match length.
    pub fn new(match_duration_minutes: i64) -> Self {
        Self {
            match_duration_minutes,
            ..Default::default()
        }
    }

    /// Timing taken from a scheduling request; the slot break is the
    /// required break.
    pub fn from_request(request: &ScheduleRequest) -> Self {
        Self {
            match_duration_minutes: request.match_duration_minutes,
            min_break_minutes: request.break_duration_minutes,
            ..Default::default()
        }
    }

    /// Sets the required break.
    pub fn with_min_break(mut self, minutes: i64) -> Self {
        self.min_break_minutes = minutes;
        self
    }

    /// Enables or disables the referee check.
    pub fn with_referee_check(mut self, enabled: bool) -> Self {
        self.check_referees = enabled;
        self
    }

    /// Enables or disables the field check.
    pub fn with_field_check(mut self, enabled: bool) -> Self {
        self.check_fields = enabled;
        self
    }
}

/// Runs every enabled detector.
///
/// Team double-booking and break violations always run; referee and field
/// checks follow the config toggles.
pub fn detect_all(
    matches: &[PlacedMatch],
    teams: &[Team],
    config: &DetectionConfig,
) -> Vec<ScheduleConflict> {
    let mut conflicts = detect_team_double_bookings(matches, teams, config);
    if config.check_referees {
        conflicts.extend(detect_referee_double_bookings(matches, config));
    }
    if config.check_fields {
        conflicts.extend(detect_field_overlaps(matches, config));
    }
    conflicts.extend(detect_break_violations(matches, teams, config));

    debug!(
        "conflict check over {} matches: {} conflict(s), {} blocking",
        matches.len(),
        conflicts.len(),
        conflicts.iter().filter(|c| c.is_blocking()).count()
    );
    conflicts
}

/// Whether a schedule has no blocking conflict.
pub fn is_committable(matches: &[PlacedMatch], teams: &[Team], config: &DetectionConfig) -> bool {
    !detect_all(matches, teams, config)
        .iter()
        .any(ScheduleConflict::is_blocking)
}
