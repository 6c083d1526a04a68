//! Turn state machine and its async driver.

pub mod controller;
pub mod machine;
pub mod phase;

pub use controller::{Controller, Tick};
pub use machine::{AppliedDecision, GameMachine};
pub use phase::{
    DecisionContext, DecisionTicket, MatchResult, PendingDecision, Phase, PhaseKind, RequestStatus,
    RoundReport,
};
