//! Engine error type.
//!
//! Every rejected transition returns one of these and leaves the game state
//! untouched. Responses from the decision provider never surface here: they
//! are coerced to a legal action instead (see `decision::validate`).

use thiserror::Error;

use super::player::Side;
use crate::engine::phase::{DecisionTicket, PhaseKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot parse card: {0}")]
    ParseCard(String),

    #[error("invalid deal: {0}")]
    InvalidDeal(String),

    #[error("trick is missing a card from one side")]
    IncompleteTrick,

    #[error("trick already holds two cards")]
    TrickFull,

    #[error("expected phase {expected:?}, game is in {actual:?}")]
    PhaseMismatch {
        expected: PhaseKind,
        actual: PhaseKind,
    },

    #[error("not the {0}'s turn")]
    OutOfTurn(Side),

    #[error("card index {index} out of range for a hand of {hand_size}")]
    CardIndexOutOfRange { index: usize, hand_size: usize },

    #[error("card not in the {0}'s hand")]
    CardNotInHand(Side),

    #[error("a truco proposal is outstanding")]
    ProposalOutstanding,

    #[error("no truco proposal to answer")]
    NoProposal,

    #[error("stake is already at the top of the ladder")]
    StakeCeiling,

    #[error("the {0} is at the hand of eleven and cannot raise")]
    HandOfEleven(Side),

    #[error("the {0} made the last raise")]
    ConsecutiveRaise(Side),

    #[error("the {0} has no legal action")]
    NoLegalAction(Side),

    #[error("stale decision {got:?}, awaiting {expected:?}")]
    StaleDecision {
        expected: Option<DecisionTicket>,
        got: DecisionTicket,
    },

    #[error("the match is over")]
    MatchOver,
}
