//! Match pairing model.
//!
//! A pairing is "who plays whom", before any field or time is chosen.
//! Group pairings are generated by the scheduler; playoff pairings are
//! supplied by the caller.

use serde::{Deserialize, Serialize};

/// Two teams that meet in one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPairing {
    /// Unique match identifier.
    pub id: String,
    /// Home team id.
    pub home: String,
    /// Away team id.
    pub away: String,
    /// Group label for group-phase matches.
    pub group: Option<String>,
    /// Whether this pairing belongs to the playoff phase.
    pub is_playoff: bool,
    /// Bracket stage label (e.g. "semi-final").
    pub bracket_stage: Option<String>,
    /// Round index within the group, 0-based. Used only for ordering.
    pub round: usize,
}

impl MatchPairing {
    /// Creates a pairing.
    pub fn new(id: impl Into<String>, home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            home: home.into(),
            away: away.into(),
            group: None,
            is_playoff: false,
            bracket_stage: None,
            round: 0,
        }
    }

    /// Sets the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Marks the pairing as a playoff match of the given stage.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.is_playoff = true;
        self.bracket_stage = Some(stage.into());
        self
    }

    /// Sets the round index.
    pub fn with_round(mut self, round: usize) -> Self {
        self.round = round;
        self
    }

    /// Whether the given team plays in this pairing.
    #[inline]
    pub fn involves(&self, team_id: &str) -> bool {
        self.home == team_id || self.away == team_id
    }

    /// Both team ids, home first.
    #[inline]
    pub fn teams(&self) -> [&str; 2] {
        [self.home.as_str(), self.away.as_str()]
    }
}
