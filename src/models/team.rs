//! Team model.

use serde::{Deserialize, Serialize};

/// A participating team.
///
/// Teams are immutable for the duration of a scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Group label for the group phase. `None` = ungrouped.
    pub group: Option<String>,
}

impl Team {
    /// Creates a team whose name defaults to its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            group: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Looks up a team's display name, falling back to the id.
pub(crate) fn display_name<'a>(teams: &'a [Team], team_id: &'a str) -> &'a str {
    teams
        .iter()
        .find(|t| t.id == team_id)
        .map(|t| t.name.as_str())
        .unwrap_or(team_id)
}
