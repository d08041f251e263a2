//! Group-phase and playoff schedulers with fairness-aware placement.
//!
//! # Algorithm
//!
//! `GroupPhaseScheduler` generates round-robin pairings for every group and
//! places them greedily into (field, slot) cells. Hard constraints: one
//! match per cell, no team twice in a slot, a minimum slot gap per team.
//! Among legal candidates the `FairnessTracker` steers towards an even
//! distribution of average rest across teams.
//!
//! `PlayoffScheduler` uses the same placement for pre-computed bracket
//! pairings, stage after stage.
//!
//! # KPI
//!
//! `ScheduleKpi` reports rest and workload spreads and field load.

mod fairness;
mod group;
mod kpi;
mod pairing;
mod placement;
mod playoff;

pub use fairness::{FairnessTracker, TeamScheduleState};
pub use group::{Group, GroupPhasePlan, GroupPhaseScheduler, ScheduleRequest};
pub use kpi::ScheduleKpi;
pub use pairing::{generate_group, Bye, GroupFixtures, PairingPattern};
pub use playoff::{PlayoffRequest, PlayoffScheduler};
