//! Referee assignment.
//!
//! Two modes:
//! - **Organizer**: a pool of referees `1..=pool_size`, balanced by workload
//!   and rest, with a consecutive-match cap that is relaxed when no referee
//!   satisfies it.
//! - **Teams**: each match is refereed by the home team of the preceding
//!   match on the same field.
//!
//! Locked assignments (`RefereeConfig::overrides`) are never overwritten.
//! Finished and running matches keep whatever referee they already have.
//!
//! # Usage
//!
//! ```
//! use u_tournament::models::{RefereeConfig, Team};
//! use u_tournament::referee::RefereeAssigner;
//! use u_tournament::scheduler::{GroupPhaseScheduler, ScheduleRequest};
//!
//! let teams: Vec<Team> = (0..4).map(|i| Team::new(format!("t{i}"))).collect();
//! let request = ScheduleRequest::from_teams(&teams).with_fields(2);
//! let matches = GroupPhaseScheduler::new().schedule(&request).unwrap();
//!
//! let assigned = RefereeAssigner::new()
//!     .assign(&matches, &teams, &RefereeConfig::organizer(2))
//!     .unwrap();
//! assert!(assigned.iter().all(|m| m.referee.is_some()));
//! ```

mod organizer;
mod team_duty;

use log::debug;

use crate::error::{Result, ScheduleError};
use crate::models::{MatchStatus, PlacedMatch, RefereeConfig, RefereeMode, Team};

/// Fills in referee numbers for a schedule.
#[derive(Debug, Clone, Default)]
pub struct RefereeAssigner;

impl RefereeAssigner {
    /// Creates an assigner.
    pub fn new() -> Self {
        Self
    }

    /// Returns a copy of `matches` with referees assigned.
    ///
    /// # Errors
    /// `InvalidRefereePool` when the pool does not fit the mode.
    pub fn assign(
        &self,
        matches: &[PlacedMatch],
        teams: &[Team],
        config: &RefereeConfig,
    ) -> Result<Vec<PlacedMatch>> {
        validate_config(config, teams)?;

        let mut out = matches.to_vec();
        match config.mode {
            RefereeMode::None => return Ok(out),
            RefereeMode::Organizer => organizer::assign(&mut out, config),
            RefereeMode::Teams => team_duty::assign(&mut out, teams, config),
        }

        debug!(
            "referees assigned ({:?} mode): {}/{} matches covered",
            config.mode,
            out.iter().filter(|m| m.referee.is_some()).count(),
            out.len()
        );
        Ok(out)
    }
}

/// Display name for a referee number.
///
/// Custom names win; in teams mode the number maps to the team's name;
/// otherwise the number itself.
pub fn resolve_referee_name(referee: u32, teams: &[Team], config: &RefereeConfig) -> String {
    if let Some(name) = config.names.get(&referee) {
        return name.clone();
    }
    if config.mode == RefereeMode::Teams {
        if let Some(team) = team_for_referee(teams, referee) {
            return team.name.clone();
        }
    }
    referee.to_string()
}

/// Referee numbers available under `config`.
pub(crate) fn referee_pool(config: &RefereeConfig, teams: &[Team]) -> Vec<u32> {
    match config.mode {
        RefereeMode::None => Vec::new(),
        RefereeMode::Organizer => (1..=config.pool_size).collect(),
        RefereeMode::Teams => (1..=teams.len() as u32).collect(),
    }
}

/// Team behind a team-duty referee number.
pub(crate) fn team_for_referee(teams: &[Team], referee: u32) -> Option<&Team> {
    (referee as usize).checked_sub(1).and_then(|idx| teams.get(idx))
}

/// Referee number of a team in teams mode.
pub(crate) fn referee_for_team(teams: &[Team], team_id: &str) -> Option<u32> {
    teams
        .iter()
        .position(|t| t.id == team_id)
        .map(|idx| idx as u32 + 1)
}

/// Finished and running matches keep their referee.
pub(crate) fn is_settled(m: &PlacedMatch) -> bool {
    matches!(m.status, MatchStatus::Finished | MatchStatus::Running)
}

/// Checks that the referee pool fits the mode.
pub(crate) fn validate_config(config: &RefereeConfig, teams: &[Team]) -> Result<()> {
    let pool = match config.mode {
        RefereeMode::None => return Ok(()),
        RefereeMode::Organizer => config.pool_size,
        RefereeMode::Teams => teams.len() as u32,
    };
    let invalid = |reason: String| ScheduleError::InvalidRefereePool {
        mode: config.mode,
        pool_size: pool,
        reason,
    };

    if pool == 0 {
        return Err(invalid(match config.mode {
            RefereeMode::Teams => "teams mode needs at least one team".to_string(),
            _ => "organizer mode needs at least one referee".to_string(),
        }));
    }
    if let Some((match_id, referee)) = config
        .overrides
        .iter()
        .find(|(_, &r)| r == 0 || r > pool)
    {
        return Err(invalid(format!(
            "override for match '{match_id}' uses referee {referee} outside 1..={pool}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> Vec<Team> {
        vec![
            Team::new("a").with_name("Alpha"),
            Team::new("b").with_name("Bravo"),
        ]
    }

    #[test]
    fn test_resolve_name() {
        let config = RefereeConfig::teams().with_name(2, "Custom");
        assert_eq!(resolve_referee_name(1, &teams(), &config), "Alpha");
        assert_eq!(resolve_referee_name(2, &teams(), &config), "Custom");
        assert_eq!(resolve_referee_name(9, &teams(), &config), "9");

        let organizer = RefereeConfig::organizer(3);
        assert_eq!(resolve_referee_name(1, &teams(), &organizer), "1");
    }

    #[test]
    fn test_validate_pool() {
        assert!(validate_config(&RefereeConfig::default(), &[]).is_ok());
        assert!(validate_config(&RefereeConfig::organizer(2), &[]).is_ok());

        let err = validate_config(&RefereeConfig::organizer(0), &[]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidRefereePool {
                mode: RefereeMode::Organizer,
                pool_size: 0,
                ..
            }
        ));
        assert!(validate_config(&RefereeConfig::teams(), &[]).is_err());
    }

    #[test]
    fn test_validate_override_range() {
        let config = RefereeConfig::organizer(2).with_override("M1", 3);
        assert!(validate_config(&config, &[]).is_err());

        let config = RefereeConfig::teams().with_override("M1", 2);
        assert!(validate_config(&config, &teams()).is_ok());
    }

    #[test]
    fn test_mode_none_leaves_matches() {
        use crate::models::MatchPairing;
        let kickoff = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        let matches = vec![PlacedMatch::new(
            MatchPairing::new("M1", "a", "b"),
            1,
            0,
            kickoff,
            10,
        )];
        let out = RefereeAssigner::new()
            .assign(&matches, &teams(), &RefereeConfig::default())
            .unwrap();
        assert_eq!(out, matches);
    }

    #[test]
    fn test_referee_team_mapping() {
        assert_eq!(referee_for_team(&teams(), "b"), Some(2));
        assert_eq!(referee_for_team(&teams(), "z"), None);
        assert_eq!(team_for_referee(&teams(), 1).map(|t| t.id.as_str()), Some("a"));
        assert!(team_for_referee(&teams(), 0).is_none());
    }
}
