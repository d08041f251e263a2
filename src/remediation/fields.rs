//! Field load flattening.

use chrono::NaiveDateTime;
use log::debug;
use std::collections::BTreeMap;

use super::RemediationResult;
use crate::error::{Result, ScheduleError};
use crate::models::{MatchChange, PlacedMatch};

/// Reassigns fields `1..=number_of_fields` round-robin among matches that
/// share the same start time, preserving every kickoff.
///
/// Within a time group matches keep their input order. Unscheduled
/// matches are left alone.
///
/// # Errors
/// `InvalidFieldCount` when `number_of_fields < 1`.
pub fn redistribute_fields(matches: &[PlacedMatch], number_of_fields: i32) -> Result<RemediationResult> {
    if number_of_fields <= 0 {
        return Err(ScheduleError::InvalidFieldCount(number_of_fields));
    }
    let fields = number_of_fields as u32;

    let mut by_start: BTreeMap<NaiveDateTime, Vec<&PlacedMatch>> = BTreeMap::new();
    for m in matches {
        if let Some(start) = m.start {
            by_start.entry(start).or_default().push(m);
        }
    }

    let mut changes = Vec::new();
    for group in by_start.values() {
        for (i, m) in group.iter().enumerate() {
            let field = (i as u32 % fields) + 1;
            if m.field != field {
                changes.push(MatchChange::field(m.id(), m.field, field));
            }
        }
    }

    debug!(
        "field redistribution over {} time group(s): {} move(s)",
        by_start.len(),
        changes.len()
    );
    if changes.is_empty() {
        return Ok(RemediationResult::nothing("field load is already even"));
    }
    let summary = format!("moved {} match(es) across {fields} field(s)", changes.len());
    Ok(RemediationResult::with_changes(changes, summary))
}
