//! Tournament scheduling core.
//!
//! Builds round-robin group phases and playoff brackets onto a shared grid
//! of fields and time slots, assigns referees, detects conflicts in a
//! placed schedule, and proposes remediation after schedule events.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `MatchPairing`, `PlacedMatch`,
//!   `RefereeConfig`, `ScheduleConflict`, `MatchChange`
//! - **`scheduler`**: `GroupPhaseScheduler`, `PlayoffScheduler`,
//!   `FairnessTracker`, pairing patterns, `ScheduleKpi`
//! - **`referee`**: `RefereeAssigner` (organizer pool and team duty)
//! - **`conflicts`**: Double-booking and break detection, what-if validation
//! - **`remediation`**: Referee reassignment, workload balancing, field
//!   redistribution
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown teams)
//!
//! # Architecture
//!
//! Every operation is a synchronous, deterministic transformation of
//! in-memory values. Schedules are passed in as slices and returned as
//! new vectors or as change lists; nothing is mutated in place or persisted.
//! Logging goes through the `log` facade.
//!
//! # Example
//!
//! ```
//! use u_tournament::conflicts::{detect_all, DetectionConfig};
//! use u_tournament::models::{RefereeConfig, Team};
//! use u_tournament::referee::RefereeAssigner;
//! use u_tournament::scheduler::{GroupPhaseScheduler, ScheduleRequest};
//!
//! let teams: Vec<Team> = (0..6).map(|i| Team::new(format!("t{i}"))).collect();
//! let request = ScheduleRequest::from_teams(&teams).with_fields(2);
//! let matches = GroupPhaseScheduler::new().schedule(&request).unwrap();
//! assert_eq!(matches.len(), 15);
//!
//! let matches = RefereeAssigner::new()
//!     .assign(&matches, &teams, &RefereeConfig::organizer(3))
//!     .unwrap();
//! let conflicts = detect_all(&matches, &teams, &DetectionConfig::from_request(&request));
//! assert!(conflicts.iter().all(|c| !c.is_blocking()));
//! ```
//!
//! # References
//!
//! - de Werra (1981), "Scheduling in Sports", Annals of Discrete Mathematics 11
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

pub mod conflicts;
pub mod error;
pub mod models;
pub mod referee;
pub mod remediation;
pub mod scheduler;
pub mod validation;

pub use error::{Result, ScheduleError};
