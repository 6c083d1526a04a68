//! Trick resolution.
//!
//! A trick is one card from each side. Resolution:
//! 1. both cards face-down: draw
//! 2. exactly one face-down: the face-up side wins, whatever the powers
//! 3. otherwise the higher power wins; equal powers draw

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

use crate::cards::{power, Card};
use crate::core::{EngineError, Side};

/// A card on the table together with who played it and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayedCard {
    pub card: Card,
    pub side: Side,
    pub face_down: bool,
}

impl PlayedCard {
    #[must_use]
    pub fn face_up(card: Card, side: Side) -> Self {
        Self {
            card,
            side,
            face_down: false,
        }
    }

    #[must_use]
    pub fn face_down(card: Card, side: Side) -> Self {
        Self {
            card,
            side,
            face_down: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrickOutcome {
    Won(Side),
    Draw,
}

impl TrickOutcome {
    #[must_use]
    pub fn winner(self) -> Option<Side> {
        match self {
            TrickOutcome::Won(side) => Some(side),
            TrickOutcome::Draw => None,
        }
    }
}

/// Decide a trick from both sides' cards.
///
/// Fails with `IncompleteTrick` unless both cards are present and come from
/// different sides.
pub fn resolve_trick(
    first: Option<&PlayedCard>,
    second: Option<&PlayedCard>,
    vira: Card,
) -> Result<TrickOutcome, EngineError> {
    let (Some(a), Some(b)) = (first, second) else {
        return Err(EngineError::IncompleteTrick);
    };
    if a.side == b.side {
        return Err(EngineError::IncompleteTrick);
    }

    let outcome = match (a.face_down, b.face_down) {
        (true, true) => TrickOutcome::Draw,
        (true, false) => TrickOutcome::Won(b.side),
        (false, true) => TrickOutcome::Won(a.side),
        (false, false) => match power(a.card, vira).cmp(&power(b.card, vira)) {
            Ordering::Greater => TrickOutcome::Won(a.side),
            Ordering::Less => TrickOutcome::Won(b.side),
            Ordering::Equal => TrickOutcome::Draw,
        },
    };
    Ok(outcome)
}

/// The open trick on the table: zero, one or two cards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    cards: SmallVec<[PlayedCard; 2]>,
}

impl Trick {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards on the table, in play order.
    #[must_use]
    pub fn cards(&self) -> &[PlayedCard] {
        &self.cards
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cards.len() == 2
    }

    #[must_use]
    pub fn card_of(&self, side: Side) -> Option<&PlayedCard> {
        self.cards.iter().find(|c| c.side == side)
    }

    /// Put a card on the table.
    pub fn play(&mut self, played: PlayedCard) -> Result<(), EngineError> {
        if self.is_complete() {
            return Err(EngineError::TrickFull);
        }
        if self.card_of(played.side).is_some() {
            return Err(EngineError::OutOfTurn(played.side));
        }
        self.cards.push(played);
        Ok(())
    }

    /// Resolve the trick, treating a missing card as a draw.
    ///
    /// The state machine only resolves complete tricks; the draw keeps the
    /// engine total if that guard is ever bypassed.
    #[must_use]
    pub fn outcome(&self, vira: Card) -> TrickOutcome {
        resolve_trick(self.cards.first(), self.cards.get(1), vira).unwrap_or_else(|err| {
            warn!(error = %err, cards = self.cards.len(), "resolving incomplete trick as draw");
            TrickOutcome::Draw
        })
    }

    /// Clear the table, returning the cards that were on it.
    pub fn take(&mut self) -> SmallVec<[PlayedCard; 2]> {
        std::mem::take(&mut self.cards)
    }
}
