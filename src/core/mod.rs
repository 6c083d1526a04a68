//! Core engine types: sides, state, actions, RNG, configuration, errors.

pub mod action;
pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind, ActionRecord};
pub use config::{LeadRule, RunPayout, TieRule, TrucoConfig};
pub use error::EngineError;
pub use player::{Side, SideMap};
pub use rng::{GameRng, GameRngState};
pub use state::{CompletedTrick, Deal, GameState, HandEnding, HandState, HandSummary, HAND_SIZE};
