//! Referee configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where referees come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefereeMode {
    /// No referee assignment.
    #[default]
    None,
    /// A pool of organizer-provided referees numbered `1..=pool_size`.
    Organizer,
    /// Teams referee each other; team `N` (1-based list position) is referee `N`.
    Teams,
}

/// Referee assignment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereeConfig {
    /// Assignment mode.
    pub mode: RefereeMode,
    /// Number of organizer referees.
    pub pool_size: u32,
    /// Consecutive-match cap. `0` disables the cap.
    pub max_consecutive_matches: u32,
    /// Custom display names by referee number.
    pub names: BTreeMap<u32, String>,
    /// Locked assignments (match id → referee number).
    pub overrides: BTreeMap<String, u32>,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            mode: RefereeMode::None,
            pool_size: 0,
            max_consecutive_matches: 2,
            names: BTreeMap::new(),
            overrides: BTreeMap::new(),
        }
    }
}

impl RefereeConfig {
    /// Organizer mode with a pool of `pool_size` referees.
    pub fn organizer(pool_size: u32) -> Self {
        Self {
            mode: RefereeMode::Organizer,
            pool_size,
            ..Default::default()
        }
    }

    /// Team-duty mode.
    pub fn teams() -> Self {
        Self {
            mode: RefereeMode::Teams,
            ..Default::default()
        }
    }

    /// Sets the consecutive-match cap.
    pub fn with_max_consecutive(mut self, max: u32) -> Self {
        self.max_consecutive_matches = max;
        self
    }

    /// Sets a custom display name.
    pub fn with_name(mut self, referee: u32, name: impl Into<String>) -> Self {
        self.names.insert(referee, name.into());
        self
    }

    /// Locks a referee onto a match.
    pub fn with_override(mut self, match_id: impl Into<String>, referee: u32) -> Self {
        self.overrides.insert(match_id.into(), referee);
        self
    }

    /// Locked referee for a match, if any.
    pub fn locked_referee(&self, match_id: &str) -> Option<u32> {
        self.overrides.get(match_id).copied()
    }

    /// Whether the cap applies to a referee whose slot gap is `gap`.
    ///
    /// A referee is eligible under the cap when the gap since their last
    /// assignment is at least `max_consecutive_matches`.
    pub(crate) fn gap_allowed(&self, gap: Option<usize>) -> bool {
        match gap {
            None => true,
            Some(g) => g >= self.max_consecutive_matches as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referee_config_builder() {
        let c = RefereeConfig::organizer(3)
            .with_max_consecutive(1)
            .with_name(2, "Anna")
            .with_override("A-R1-M1", 3);
        assert_eq!(c.mode, RefereeMode::Organizer);
        assert_eq!(c.pool_size, 3);
        assert_eq!(c.names.get(&2).map(String::as_str), Some("Anna"));
        assert_eq!(c.locked_referee("A-R1-M1"), Some(3));
        assert_eq!(c.locked_referee("A-R1-M2"), None);
    }

    #[test]
    fn test_gap_allowed() {
        let c = RefereeConfig::organizer(2).with_max_consecutive(2);
        assert!(c.gap_allowed(None));
        assert!(c.gap_allowed(Some(2)));
        assert!(!c.gap_allowed(Some(1)));
    }

    #[test]
    fn test_deserialize_partial() {
        let c: RefereeConfig =
            serde_json::from_str(r#"{"mode":"teams","max_consecutive_matches":1}"#).unwrap();
        assert_eq!(c.mode, RefereeMode::Teams);
        assert_eq!(c.max_consecutive_matches, 1);
        assert!(c.overrides.is_empty());
    }
}
