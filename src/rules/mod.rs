//! Truco Paulista rules, free of turn sequencing.
//!
//! - `trick`: who takes a trick
//! - `hand`: who takes a hand, as a decision table over its tricks
//! - `betting`: the 1/3/6/9/12 stake ladder
//!
//! The state machine in `engine` decides when each of these is consulted.

pub mod betting;
pub mod hand;
pub mod trick;

pub use betting::{Betting, Proposal, RunSettlement, Stake};
pub use hand::{evaluate_hand, HandVerdict, RoundWinner, TieBreak};
pub use trick::{resolve_trick, PlayedCard, Trick, TrickOutcome};
