//! Round-robin pairing generation.
//!
//! # Algorithm
//!
//! The default pattern is the circle method: team 0 stays fixed while the
//! others rotate one position per round. Odd-sized groups get a synthetic
//! BYE team; whoever meets the BYE sits the round out. Home and away
//! alternate by round so no team is always listed first.
//!
//! Every pattern yields each unordered pair of a group exactly once:
//! `n * (n - 1) / 2` pairings, `n - 1` per team.
//!
//! # Reference
//! Kirkman (1847); de Werra (1981), "Scheduling in sports"

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, ScheduleError};
use crate::models::{MatchPairing, Team};

/// Pairing order for a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPattern {
    /// Circle-method rounds (default).
    #[default]
    RoundRobin,
    /// Naive `i < j` order.
    Sequential,
    /// Predetermined fixture order as 1-based team positions.
    Fixed(Vec<(usize, usize)>),
}

impl PairingPattern {
    /// Parses a pattern code.
    ///
    /// Accepts `"round_robin"`, `"sequential"`, or a fixture list such as
    /// `"1-2,3-4,1-3,2-4,1-4,2-3"`.
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim();
        match code.to_ascii_lowercase().as_str() {
            "" | "round_robin" | "roundrobin" | "rr" => return Ok(Self::RoundRobin),
            "sequential" | "seq" => return Ok(Self::Sequential),
            _ => {}
        }

        let mut pairs = Vec::new();
        for item in code.split(',') {
            let (a, b) = item
                .trim()
                .split_once('-')
                .ok_or_else(|| ScheduleError::InvalidPattern(format!("expected 'a-b', got '{item}'")))?;
            let parse = |s: &str| {
                s.trim()
                    .parse::<usize>()
                    .map_err(|_| ScheduleError::InvalidPattern(format!("not a team position: '{s}'")))
            };
            pairs.push((parse(a)?, parse(b)?));
        }
        Ok(Self::Fixed(pairs))
    }
}

/// A team's round off in an odd-sized group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bye {
    pub round: usize,
    pub team_id: String,
}

/// Generated fixtures of one group.
#[derive(Debug, Clone, Default)]
pub struct GroupFixtures {
    /// Real pairings, in generation order.
    pub pairings: Vec<MatchPairing>,
    /// BYE pairings; never placed.
    pub byes: Vec<Bye>,
}

/// Generates the fixtures of one group.
pub fn generate_group(label: &str, teams: &[Team], pattern: &PairingPattern) -> Result<GroupFixtures> {
    let n = teams.len();
    if n < 2 {
        return Ok(GroupFixtures::default());
    }

    let (order, byes) = match pattern {
        PairingPattern::RoundRobin => circle_rounds(n),
        PairingPattern::Sequential => (sequential_rounds(n), Vec::new()),
        PairingPattern::Fixed(pairs) => (fixed_rounds(n, pairs)?, Vec::new()),
    };

    let mut pairings = Vec::with_capacity(order.len());
    let mut current_round = usize::MAX;
    let mut k = 0;
    for (round, home, away) in order {
        if round != current_round {
            current_round = round;
            k = 0;
        }
        k += 1;
        let id = if label.is_empty() {
            format!("R{}-M{}", round + 1, k)
        } else {
            format!("{label}-R{}-M{}", round + 1, k)
        };
        let mut pairing = MatchPairing::new(id, &teams[home].id, &teams[away].id).with_round(round);
        if !label.is_empty() {
            pairing = pairing.with_group(label);
        }
        pairings.push(pairing);
    }

    let byes = byes
        .into_iter()
        .map(|(round, idx)| Bye {
            round,
            team_id: teams[idx].id.clone(),
        })
        .collect();

    Ok(GroupFixtures { pairings, byes })
}

type RoundOrder = Vec<(usize, usize, usize)>;

fn circle_rounds(n: usize) -> (RoundOrder, Vec<(usize, usize)>) {
    // `None` is the BYE.
    let mut ring: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        ring.push(None);
    }
    let m = ring.len();

    let mut order = Vec::with_capacity(n * (n - 1) / 2);
    let mut byes = Vec::new();
    for round in 0..m - 1 {
        for i in 0..m / 2 {
            match (ring[i], ring[m - 1 - i]) {
                (Some(a), Some(b)) => {
                    if (round + i) % 2 == 0 {
                        order.push((round, a, b));
                    } else {
                        order.push((round, b, a));
                    }
                }
                (Some(t), None) | (None, Some(t)) => byes.push((round, t)),
                (None, None) => {}
            }
        }
        ring[1..].rotate_right(1);
    }
    (order, byes)
}

fn sequential_rounds(n: usize) -> RoundOrder {
    let mut order = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            order.push((i, i, j));
        }
    }
    order
}

fn fixed_rounds(n: usize, pairs: &[(usize, usize)]) -> Result<RoundOrder> {
    let expected = n * (n - 1) / 2;
    if pairs.len() != expected {
        return Err(ScheduleError::InvalidPattern(format!(
            "group of {n} needs {expected} fixtures, pattern has {}",
            pairs.len()
        )));
    }

    let per_round = (n / 2).max(1);
    let mut seen = HashSet::with_capacity(expected);
    let mut order = Vec::with_capacity(expected);
    for (k, &(a, b)) in pairs.iter().enumerate() {
        if a == 0 || b == 0 || a > n || b > n || a == b {
            return Err(ScheduleError::InvalidPattern(format!(
                "fixture {a}-{b} is not a valid pairing for {n} teams"
            )));
        }
        if !seen.insert((a.min(b), a.max(b))) {
            return Err(ScheduleError::InvalidPattern(format!("fixture {a}-{b} appears twice")));
        }
        order.push((k / per_round, a - 1, b - 1));
    }
    Ok(order)
}
