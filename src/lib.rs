//! # truco-engine
//!
//! A two-seat Truco Paulista engine: a human player against an opponent
//! whose moves come from an external decision provider.
//!
//! ## Design Principles
//!
//! 1. **Power is derived**: a card's strength depends on the vira and is
//!    computed on demand, never stored on the card.
//!
//! 2. **One writer**: `GameMachine` is the only thing that mutates the game.
//!    Each transition is guarded by the current phase and either applies
//!    fully or returns an `EngineError` and changes nothing.
//!
//! 3. **Untrusted opponent**: provider responses are matched to a ticket,
//!    revalidated against the current state and coerced to a legal action.
//!    A failed or slow provider is replaced by a seeded fallback policy.
//!
//! ## Modules
//!
//! - `core`: sides, state, actions, RNG, configuration, errors
//! - `cards`: cards, the deck, vira-relative power
//! - `rules`: tricks, hand verdicts, the betting ladder
//! - `engine`: phases, the state machine, the async controller
//! - `decision`: provider contract, per-side views, coercion, fallback

pub mod cards;
pub mod core;
pub mod decision;
pub mod engine;
pub mod rules;

pub use crate::core::{
    Action, ActionKind, ActionRecord, Deal, EngineError, GameRng, GameState, HandEnding,
    HandState, HandSummary, LeadRule, RunPayout, Side, SideMap, TieRule, TrucoConfig,
};

pub use crate::cards::{create_deck, is_manilha, manilha_rank, power, Card, Rank, Suit};

pub use crate::rules::{HandVerdict, RoundWinner, Stake, TrickOutcome};

pub use crate::engine::{
    AppliedDecision, Controller, DecisionTicket, GameMachine, MatchResult, Phase, PhaseKind,
    RoundReport, Tick,
};

pub use crate::decision::{
    Coercion, DecisionError, DecisionProvider, DecisionRequest, DecisionResponse, DecisionStats,
    FallbackPolicy, GameView, WeightedFallback,
};
