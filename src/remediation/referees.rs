//! Referee remediation: reassignment, skip recovery, workload balancing.
//!
//! Busy time is tracked per referee number from active matches. In teams
//! mode a team is also busy while it plays, so it never referees its own
//! match or one running in parallel.

use chrono::{Duration, NaiveDateTime};
use log::{debug, warn};
use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::{diff_referees, RemediationResult};
use crate::conflicts::{detect_referee_double_bookings, DetectionConfig};
use crate::error::{Result, ScheduleError};
use crate::models::{MatchChange, PlacedMatch, RefereeConfig, RefereeMode, Team};
use crate::referee::{is_settled, referee_for_team, referee_pool, validate_config};

type Span = (NaiveDateTime, NaiveDateTime);

fn overlaps(a: Span, b: Span) -> bool {
    a.0 < b.1 && a.1 > b.0
}

#[derive(Debug, Default)]
struct DutyBook {
    refereeing: BTreeMap<u32, Vec<Span>>,
    playing: BTreeMap<u32, Vec<Span>>,
}

impl DutyBook {
    /// Books the active matches; `unbooked` ones contribute playing time only.
    fn build<'a>(
        matches: impl Iterator<Item = &'a PlacedMatch>,
        teams: &[Team],
        config: &RefereeConfig,
        duration: i64,
        unbooked: impl Fn(&PlacedMatch) -> bool,
    ) -> Self {
        let mut book = Self::default();
        for m in matches.filter(|m| m.is_active()) {
            let Some(span) = m.window(duration) else {
                continue;
            };
            if config.mode == RefereeMode::Teams {
                for team in m.pairing.teams() {
                    if let Some(r) = referee_for_team(teams, team) {
                        book.playing.entry(r).or_default().push(span);
                    }
                }
            }
            if unbooked(m) {
                continue;
            }
            if let Some(r) = m.referee {
                book.assign(r, span);
            }
        }
        book
    }

    fn assign(&mut self, referee: u32, span: Span) {
        self.refereeing.entry(referee).or_default().push(span);
    }

    fn release(&mut self, referee: u32, span: Span) {
        if let Some(spans) = self.refereeing.get_mut(&referee) {
            if let Some(pos) = spans.iter().position(|s| *s == span) {
                spans.swap_remove(pos);
            }
        }
    }

    fn workload(&self, referee: u32) -> usize {
        self.refereeing.get(&referee).map_or(0, Vec::len)
    }

    fn is_free(&self, referee: u32, span: Span) -> bool {
        [&self.refereeing, &self.playing].iter().all(|book| {
            book.get(&referee)
                .map_or(true, |spans| spans.iter().all(|s| !overlaps(*s, span)))
        })
    }

    /// Length of the back-to-back run of duties ending just before `start`.
    fn consecutive(&self, referee: u32, start: NaiveDateTime, duration: i64) -> usize {
        let Some(spans) = self.refereeing.get(&referee) else {
            return 0;
        };
        let max_gap = Duration::minutes(duration);
        let mut count = 0;
        let mut cursor = start;
        while let Some(prev) = spans
            .iter()
            .filter(|s| s.1 <= cursor && cursor - s.1 < max_gap)
            .max_by_key(|s| s.1)
        {
            count += 1;
            cursor = prev.0;
        }
        count
    }
}

/// Picks the free referee with the lowest `workload * 10 + consecutive`.
///
/// Returns the referee and whether the consecutive cap held.
fn pick_referee(
    book: &DutyBook,
    pool: &[u32],
    span: Span,
    duration: i64,
    cap: u32,
) -> Option<(u32, bool)> {
    let score = |r: u32| book.workload(r) * 10 + book.consecutive(r, span.0, duration);
    let free: Vec<u32> = pool.iter().copied().filter(|&r| book.is_free(r, span)).collect();

    let strict = free
        .iter()
        .copied()
        .filter(|&r| cap == 0 || book.consecutive(r, span.0, duration) < cap as usize)
        .min_by_key(|&r| (score(r), r));
    if let Some(r) = strict {
        return Some((r, true));
    }
    free.into_iter().min_by_key(|&r| (score(r), r)).map(|r| (r, false))
}

fn schedule_order(matches: &[PlacedMatch], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| {
        let (ma, mb) = (&matches[a], &matches[b]);
        (ma.start, ma.field, ma.id()).cmp(&(mb.start, mb.field, mb.id()))
    });
}

/// Matches whose referee the routines may change.
fn is_open(m: &PlacedMatch, config: &RefereeConfig) -> bool {
    m.is_active() && !is_settled(m) && config.locked_referee(m.id()).is_none()
}

/// Reassigns referees from the current schedule state.
///
/// Unassigned open matches are filled; with `force` every open match is
/// re-evaluated. Locked, running, finished, and skipped matches are left
/// alone. Locked and running matches count towards workload; finished
/// and skipped ones do not.
///
/// # Errors
/// `InvalidRefereePool` when the pool does not fit the mode.
pub fn auto_reassign_referees(
    matches: &[PlacedMatch],
    teams: &[Team],
    config: &RefereeConfig,
    detection: &DetectionConfig,
    force: bool,
) -> Result<RemediationResult> {
    validate_config(config, teams)?;
    let pool = referee_pool(config, teams);
    if pool.is_empty() {
        return Ok(RemediationResult::nothing("referee assignment is disabled"));
    }

    let duration = detection.match_duration_minutes;
    let eligible = |m: &PlacedMatch| is_open(m, config) && (force || m.referee.is_none());
    let mut book = DutyBook::build(matches.iter(), teams, config, duration, eligible);

    let mut order: Vec<usize> = (0..matches.len()).filter(|&i| eligible(&matches[i])).collect();
    schedule_order(matches, &mut order);

    let mut working = matches.to_vec();
    let mut stranded = 0;
    for i in order {
        let Some(span) = matches[i].window(duration) else {
            continue;
        };
        match pick_referee(&book, &pool, span, duration, config.max_consecutive_matches) {
            Some((r, strict)) => {
                if !strict {
                    warn!(
                        "consecutive cap of {} relaxed for match {}: referee {r}",
                        config.max_consecutive_matches,
                        matches[i].id()
                    );
                }
                book.assign(r, span);
                working[i].referee = Some(r);
            }
            None => {
                stranded += 1;
                if let Some(old) = matches[i].referee {
                    book.assign(old, span);
                }
            }
        }
    }

    let changes = diff_referees(matches, &working);
    let unresolved = detect_referee_double_bookings(&working, detection);
    debug!(
        "auto-reassign: {} change(s), {} stranded, {} unresolved",
        changes.len(),
        stranded,
        unresolved.len()
    );
    let summary = format!(
        "reassigned {} match(es), {stranded} without a free referee",
        changes.len()
    );
    Ok(RemediationResult::with_changes(changes, summary).with_unresolved(unresolved))
}

/// Hands the referee of a skipped match to the first unassigned match
/// (in schedule order) they can take without a time conflict.
///
/// # Errors
/// `UnknownMatch` when `skipped_id` is not in the schedule.
pub fn redistribute_after_skip(
    matches: &[PlacedMatch],
    skipped_id: &str,
    teams: &[Team],
    config: &RefereeConfig,
    detection: &DetectionConfig,
) -> Result<RemediationResult> {
    let skipped = matches
        .iter()
        .find(|m| m.id() == skipped_id)
        .ok_or_else(|| ScheduleError::UnknownMatch(skipped_id.to_string()))?;
    let Some(freed) = skipped.referee else {
        return Ok(RemediationResult::nothing(format!(
            "match {skipped_id} had no referee"
        )));
    };

    let duration = detection.match_duration_minutes;
    let remaining = matches.iter().filter(|m| m.id() != skipped_id);
    let book = DutyBook::build(remaining, teams, config, duration, |_| false);

    let mut open: Vec<usize> = (0..matches.len())
        .filter(|&i| {
            let m = &matches[i];
            m.id() != skipped_id && m.referee.is_none() && is_open(m, config)
        })
        .collect();
    schedule_order(matches, &mut open);

    let taker = open.into_iter().find(|&i| {
        matches[i]
            .window(duration)
            .is_some_and(|span| book.is_free(freed, span))
    });
    let Some(i) = taker else {
        return Ok(RemediationResult::nothing(format!(
            "no unassigned match fits referee {freed}"
        )));
    };

    let target = matches[i].id();
    let mut working = matches.to_vec();
    working[i].referee = Some(freed);
    let unresolved = detect_referee_double_bookings(&working, detection);
    Ok(RemediationResult::with_changes(
        vec![MatchChange::referee(target, None, Some(freed))],
        format!("referee {freed} moves from {skipped_id} to {target}"),
    )
    .with_unresolved(unresolved))
}

struct Loads {
    current: BTreeMap<u32, usize>,
    target: BTreeMap<u32, usize>,
}

impl Loads {
    fn excess(&self, referee: u32) -> i64 {
        self.current[&referee] as i64 - self.target[&referee] as i64
    }

    /// Donor/receiver pairs worth a transfer, most imbalanced first.
    fn transfer_pairs(&self, pool: &[u32]) -> Vec<(u32, u32)> {
        let mut pairs: Vec<(u32, u32)> = pool
            .iter()
            .flat_map(|&d| pool.iter().map(move |&r| (d, r)))
            .filter(|&(d, r)| {
                let (ed, er) = (self.excess(d), self.excess(r));
                d != r && ((ed > 1 && er < 0) || (ed > 0 && er < -1))
            })
            .collect();
        pairs.sort_by_key(|&(d, r)| (Reverse(self.excess(d) - self.excess(r)), d, r));
        pairs
    }
}

/// Evens out referee workloads.
///
/// Each referee's target is `total / n`, plus one for the first
/// `total % n` referees. Referees more than one match off target are
/// flagged; matches then move one at a time from an above-target to a
/// below-target referee whenever one side is flagged and the receiver is
/// free at that time.
///
/// # Errors
/// `InvalidRefereePool` when the pool does not fit the mode.
pub fn balance_workloads(
    matches: &[PlacedMatch],
    teams: &[Team],
    config: &RefereeConfig,
    detection: &DetectionConfig,
) -> Result<RemediationResult> {
    validate_config(config, teams)?;
    let pool = referee_pool(config, teams);
    if pool.is_empty() {
        return Ok(RemediationResult::nothing("referee assignment is disabled"));
    }

    let duration = detection.match_duration_minutes;
    let mut book = DutyBook::build(matches.iter(), teams, config, duration, |_| false);

    let current: BTreeMap<u32, usize> = pool.iter().map(|&r| (r, book.workload(r))).collect();
    let total: usize = current.values().sum();
    let n = pool.len();
    let target = pool
        .iter()
        .enumerate()
        .map(|(i, &r)| (r, total / n + usize::from(i < total % n)))
        .collect();
    let mut loads = Loads { current, target };

    let over: Vec<u32> = pool.iter().copied().filter(|&r| loads.excess(r) > 1).collect();
    let under: Vec<u32> = pool.iter().copied().filter(|&r| loads.excess(r) < -1).collect();
    if over.is_empty() && under.is_empty() {
        return Ok(RemediationResult::nothing(
            "referee workloads are within one match of target",
        ));
    }

    let mut movable: Vec<usize> = (0..matches.len())
        .filter(|&i| matches[i].referee.is_some() && is_open(&matches[i], config))
        .collect();
    schedule_order(matches, &mut movable);

    let mut working = matches.to_vec();
    while let Some((i, from, to, span)) = next_transfer(&working, &movable, &book, &loads, &pool, duration) {
        book.release(from, span);
        book.assign(to, span);
        if let Some(c) = loads.current.get_mut(&from) {
            *c -= 1;
        }
        if let Some(c) = loads.current.get_mut(&to) {
            *c += 1;
        }
        working[i].referee = Some(to);
    }

    let changes = diff_referees(matches, &working);
    let unresolved = detect_referee_double_bookings(&working, detection);
    let summary = format!(
        "over-loaded {over:?}, under-loaded {under:?}: moved {} match(es)",
        changes.len()
    );
    debug!("workload balance: {summary}");
    Ok(RemediationResult::with_changes(changes, summary).with_unresolved(unresolved))
}

fn next_transfer(
    working: &[PlacedMatch],
    movable: &[usize],
    book: &DutyBook,
    loads: &Loads,
    pool: &[u32],
    duration: i64,
) -> Option<(usize, u32, u32, Span)> {
    loads.transfer_pairs(pool).into_iter().find_map(|(from, to)| {
        movable.iter().find_map(|&i| {
            let m = &working[i];
            let span = m.window(duration)?;
            (m.referee == Some(from) && book.is_free(to, span)).then_some((i, from, to, span))
        })
    })
}
