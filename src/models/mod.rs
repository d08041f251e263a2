//! Tournament scheduling domain models.
//!
//! Provides the data types shared by the scheduler, the referee assigner,
//! the conflict detector, and the remediation routines.
//!
//! # Lifecycle
//!
//! | Type | Produced by | Mutated by |
//! |------|-------------|------------|
//! | Team | caller | never, during a run |
//! | MatchPairing | pairing generation / caller | never after placement |
//! | PlacedMatch | scheduler | referee assigner, external editing |
//! | ScheduleConflict | conflict detector | never |
//! | MatchChange | remediation | never; applied by the caller |

mod change;
mod conflict;
mod pairing;
mod placed;
mod referee;
mod team;

pub use change::{ChangedField, MatchChange, MatchEdit, ProposedChange};
pub use conflict::{ConflictContext, ConflictKind, ScheduleConflict, Severity, ID_SEPARATOR};
pub use pairing::MatchPairing;
pub use placed::{MatchList, MatchStatus, PlacedMatch, Score};
pub use referee::{RefereeConfig, RefereeMode};
pub use team::Team;

pub(crate) use team::display_name;
