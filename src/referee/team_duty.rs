//! Team-duty referee assignment.
//!
//! Per field, in slot order, the home team of the preceding match referees
//! the next one. When that team plays in the same slot the preceding away
//! team steps in; when both play, the match gets no referee. Skipped
//! matches are passed over and keep their referee.

use std::collections::{BTreeMap, HashSet};

use super::{is_settled, referee_for_team};
use crate::models::{MatchStatus, PlacedMatch, RefereeConfig, Team};

/// Assigns team referees in place.
pub(super) fn assign(matches: &mut [PlacedMatch], teams: &[Team], config: &RefereeConfig) {
    let playing: HashSet<(usize, &str)> = matches
        .iter()
        .filter(|m| m.status != MatchStatus::Skipped)
        .flat_map(|m| m.pairing.teams().map(|t| (m.slot, t)))
        .collect();

    let mut by_field: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, m) in matches.iter().enumerate() {
        if m.status != MatchStatus::Skipped {
            by_field.entry(m.field).or_default().push(i);
        }
    }

    let mut assigned: Vec<(usize, Option<u32>)> = Vec::with_capacity(matches.len());
    for indices in by_field.values_mut() {
        indices.sort_by_key(|&i| matches[i].slot);

        let mut previous: Option<&PlacedMatch> = None;
        for &i in indices.iter() {
            let current = &matches[i];
            let referee = if let Some(locked) = config.locked_referee(current.id()) {
                Some(locked)
            } else if is_settled(current) {
                current.referee
            } else {
                previous.and_then(|prev| {
                    [prev.home(), prev.away()]
                        .into_iter()
                        .filter(|team| !playing.contains(&(current.slot, *team)))
                        .find_map(|team| referee_for_team(teams, team))
                })
            };
            assigned.push((i, referee));
            previous = Some(current);
        }
    }

    for (i, referee) in assigned {
        matches[i].referee = referee;
    }
}
