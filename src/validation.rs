//! Input validation for scheduling runs.
//!
//! Checks structural integrity of teams, pairings, and timing before
//! scheduling. Detects:
//! - Duplicate or empty IDs
//! - Pairings that reference unknown teams
//! - Pairings of a team against itself
//! - Non-positive match durations and negative breaks
//!
//! All problems are collected; validation does not stop at the first one.

use crate::models::{MatchPairing, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity has an empty ID.
    EmptyId,
    /// A pairing references a team that doesn't exist.
    UnknownTeam,
    /// A pairing has the same team on both sides.
    SelfPairing,
    /// Match or break duration out of range.
    InvalidTiming,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a team list.
///
/// Checks:
/// 1. No empty team IDs
/// 2. No duplicate team IDs (across all groups)
pub fn validate_teams(teams: &[Team]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for team in teams {
        if team.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Team '{}' has an empty ID", team.name),
            ));
            continue;
        }
        if !ids.insert(team.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate team ID: {}", team.id),
            ));
        }
    }

    finish(errors)
}

/// Validates pairings, optionally against a known team list.
///
/// Checks:
/// 1. No empty or duplicate pairing IDs
/// 2. No team paired against itself
/// 3. Both sides reference known teams (when `teams` is given)
pub fn validate_pairings(pairings: &[MatchPairing], teams: Option<&[Team]>) -> ValidationResult {
    let mut errors = Vec::new();
    let known: Option<HashSet<&str>> = teams.map(|ts| ts.iter().map(|t| t.id.as_str()).collect());
    let mut ids = HashSet::new();

    for p in pairings {
        if p.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Pairing {} vs {} has an empty ID", p.home, p.away),
            ));
        } else if !ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate match ID: {}", p.id),
            ));
        }

        if p.home == p.away {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfPairing,
                format!("Match '{}' pairs team '{}' against itself", p.id, p.home),
            ));
        }

        if let Some(known) = &known {
            for side in p.teams() {
                if !known.contains(side) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownTeam,
                        format!("Match '{}' references unknown team '{side}'", p.id),
                    ));
                }
            }
        }
    }

    finish(errors)
}

/// Validates match timing.
pub fn validate_timing(match_minutes: i64, break_minutes: i64) -> ValidationResult {
    let mut errors = Vec::new();
    if match_minutes <= 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTiming,
            format!("Match duration must be positive, got {match_minutes} minutes"),
        ));
    }
    if break_minutes < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTiming,
            format!("Break duration must not be negative, got {break_minutes} minutes"),
        ));
    }
    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_teams() {
        let teams = vec![Team::new("a"), Team::new("b").with_group("B")];
        assert!(validate_teams(&teams).is_ok());
    }

    #[test]
    fn test_duplicate_team_id() {
        let teams = vec![Team::new("a").with_group("A"), Team::new("a").with_group("B")];
        let errors = validate_teams(&teams).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_empty_team_id() {
        let teams = vec![Team::new(" ").with_name("Nameless")];
        let errors = validate_teams(&teams).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyId);
    }

    #[test]
    fn test_pairing_unknown_team() {
        let teams = vec![Team::new("a"), Team::new("b")];
        let pairings = vec![MatchPairing::new("M1", "a", "z")];
        let errors = validate_pairings(&pairings, Some(&teams)).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownTeam && e.message.contains("'z'")));
        // Without a team list, placeholders are accepted.
        assert!(validate_pairings(&pairings, None).is_ok());
    }

    #[test]
    fn test_pairing_self_and_duplicate() {
        let pairings = vec![
            MatchPairing::new("M1", "a", "a"),
            MatchPairing::new("M1", "a", "b"),
        ];
        let errors = validate_pairings(&pairings, None).unwrap_err();
        assert!(errors.len() >= 2);
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::SelfPairing));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_timing() {
        assert!(validate_timing(10, 0).is_ok());
        let errors = validate_timing(0, -5).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvalidTiming));
    }
}
