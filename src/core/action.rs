//! Game actions and the action history.
//!
//! `Action` is what the engine applies: a fully resolved move naming the
//! actual card. `ActionKind` is the bare verb, as it travels over the
//! decision boundary before validation.

use serde::{Deserialize, Serialize};

use super::player::Side;
use crate::cards::Card;

/// A legal-shaped game action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Put a card from hand on the table.
    Play { card: Card, face_down: bool },
    /// Ask for the next rung of the stake ladder on one's own turn.
    Truco,
    /// Accept the outstanding proposal.
    Accept,
    /// Counter the outstanding proposal with the rung above it.
    Raise,
    /// Refuse the outstanding proposal, conceding the hand.
    Run,
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Play { .. } => ActionKind::Play,
            Action::Truco => ActionKind::Truco,
            Action::Accept => ActionKind::Accept,
            Action::Raise => ActionKind::Raise,
            Action::Run => ActionKind::Run,
        }
    }

    #[must_use]
    pub fn is_bet(&self) -> bool {
        !matches!(self, Action::Play { .. })
    }
}

/// Action verb as named by a decision provider.
///
/// `Fold` is accepted on the wire as a synonym of `Run`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Play,
    Truco,
    Accept,
    Run,
    Raise,
    Fold,
}

/// An applied action, in match order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub side: Side,
    pub action: Action,
    /// Hand number (starts at 1).
    pub hand: u32,
    /// Match-wide sequence number.
    pub sequence: u32,
}

impl ActionRecord {
    #[must_use]
    pub fn new(side: Side, action: Action, hand: u32, sequence: u32) -> Self {
        Self {
            side,
            action,
            hand,
            sequence,
        }
    }
}
