//! Phases of the turn state machine.
//!
//! ```text
//! Dealing → PlayerTurn ⇄ (AiThinking | TrucoProposalPlayer | TrucoProposalAi)
//!         → RoundResult → PlayerTurn / AiThinking (next trick) | Dealing (next hand)
//!         → GameOver
//! ```
//!
//! The two phases in which the opponent must act (`AiThinking` on its own
//! turn, `TrucoProposalPlayer` when answering the player's proposal) carry
//! the decision they are waiting on. While in them, no other side can act,
//! so a pending decision cannot desync from the phase it belongs to.

use serde::{Deserialize, Serialize};

use crate::core::{CompletedTrick, HandSummary, Side, SideMap};
use crate::rules::Proposal;

/// Identifies one decision request. Monotonic per machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionTicket(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting to be handed to the decision provider.
    Queued,
    /// Handed out; only its response may move the machine on.
    InFlight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingDecision {
    pub ticket: DecisionTicket,
    pub status: RequestStatus,
}

/// What a decision request is asking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionContext {
    /// The opponent's own turn: play a card or propose.
    Turn,
    /// Answer the player's proposal.
    Respond(Proposal),
}

/// What was observed when leaving play for a moment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    /// The trick just resolved, if the round ended with a trick.
    pub trick: Option<CompletedTrick>,
    /// Set when the hand is over.
    pub hand: Option<HandSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub winner: Side,
    pub scores: SideMap<u8>,
    pub final_hand: HandSummary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next deal.
    Dealing,
    /// The player is due to play or propose.
    PlayerTurn,
    /// The opponent is due to play or propose.
    AiThinking(PendingDecision),
    /// The player proposed; the opponent must answer.
    TrucoProposalPlayer(PendingDecision),
    /// The opponent proposed; the player must answer.
    TrucoProposalAi,
    /// A trick (and maybe the hand) just resolved.
    RoundResult(RoundReport),
    /// Terminal.
    GameOver(MatchResult),
}

/// Payload-free phase tag, for errors and snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Dealing,
    PlayerTurn,
    AiThinking,
    TrucoProposalPlayer,
    TrucoProposalAi,
    RoundResult,
    GameOver,
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Dealing => PhaseKind::Dealing,
            Phase::PlayerTurn => PhaseKind::PlayerTurn,
            Phase::AiThinking(_) => PhaseKind::AiThinking,
            Phase::TrucoProposalPlayer(_) => PhaseKind::TrucoProposalPlayer,
            Phase::TrucoProposalAi => PhaseKind::TrucoProposalAi,
            Phase::RoundResult(_) => PhaseKind::RoundResult,
            Phase::GameOver(_) => PhaseKind::GameOver,
        }
    }

    /// Side allowed to act, if any.
    #[must_use]
    pub fn actor(&self) -> Option<Side> {
        match self {
            Phase::PlayerTurn | Phase::TrucoProposalAi => Some(Side::Player),
            Phase::AiThinking(_) | Phase::TrucoProposalPlayer(_) => Some(Side::Opponent),
            Phase::Dealing | Phase::RoundResult(_) | Phase::GameOver(_) => None,
        }
    }

    /// True while the actor must answer a proposal rather than play.
    #[must_use]
    pub fn is_responding(&self) -> bool {
        matches!(self, Phase::TrucoProposalPlayer(_) | Phase::TrucoProposalAi)
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingDecision> {
        match self {
            Phase::AiThinking(pending) | Phase::TrucoProposalPlayer(pending) => Some(pending),
            _ => None,
        }
    }

    pub(crate) fn pending_mut(&mut self) -> Option<&mut PendingDecision> {
        match self {
            Phase::AiThinking(pending) | Phase::TrucoProposalPlayer(pending) => Some(pending),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(self, Phase::GameOver(_))
    }
}
