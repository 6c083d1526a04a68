//! Per-side snapshot of the game.
//!
//! A `GameView` shows exactly what one seat may know: its own cards, the
//! size (not the contents) of the other hand, and face-down cards played by
//! the other side with their identity masked, both on the table and in
//! the history.

use serde::{Deserialize, Serialize};

use crate::cards::{is_manilha, manilha_rank, power, Card, Rank};
use crate::core::{Action, ActionKind, ActionRecord, GameState, Side, HAND_SIZE};
use crate::engine::phase::{Phase, PhaseKind};
use crate::rules::{PlayedCard, Proposal, RoundWinner, Stake, TrickOutcome};

/// A card in the viewer's own hand, with its derived strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    /// Position to name in a `PLAY` response.
    pub index: usize,
    pub card: Card,
    pub power: u8,
    pub manilha: bool,
}

/// A played card as seen by the viewer. `card` is `None` when the other
/// side played it face-down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleCard {
    pub side: Side,
    pub face_down: bool,
    pub card: Option<Card>,
}

impl VisibleCard {
    fn of(played: &PlayedCard, viewer: Side) -> Self {
        Self {
            side: played.side,
            face_down: played.face_down,
            card: visible(played.card, played.side, played.face_down, viewer),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleTrick {
    pub cards: Vec<VisibleCard>,
    pub leader: Side,
    pub outcome: TrickOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleAction {
    pub side: Side,
    pub hand: u32,
    pub sequence: u32,
    pub kind: ActionKind,
    pub card: Option<Card>,
    pub face_down: bool,
}

impl VisibleAction {
    fn of(record: &ActionRecord, viewer: Side) -> Self {
        let (card, face_down) = match record.action {
            Action::Play { card, face_down } => {
                (visible(card, record.side, face_down, viewer), face_down)
            }
            _ => (None, false),
        };
        Self {
            side: record.side,
            hand: record.hand,
            sequence: record.sequence,
            kind: record.action.kind(),
            card,
            face_down,
        }
    }
}

fn visible(card: Card, owner: Side, face_down: bool, viewer: Side) -> Option<Card> {
    (!face_down || owner == viewer).then_some(card)
}

/// Everything one side may see.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub viewer: Side,
    pub phase: PhaseKind,
    pub hand_number: u32,
    pub hand: Vec<HandCard>,
    pub other_hand_size: usize,
    pub vira: Card,
    pub manilha: Rank,
    /// Cards on the table this trick, in play order.
    pub table: Vec<VisibleCard>,
    /// Resolved tricks this hand, oldest first.
    pub tricks: Vec<VisibleTrick>,
    pub round_winners: [RoundWinner; HAND_SIZE],
    pub my_score: u8,
    pub their_score: u8,
    pub stake: Stake,
    pub pending: Option<Proposal>,
    pub turn: Side,
    pub history: Vec<VisibleAction>,
    pub legal_actions: Vec<Action>,
}

impl GameView {
    /// Build `viewer`'s view. `None` before the first deal.
    #[must_use]
    pub fn build(state: &GameState, phase: &Phase, viewer: Side, legal_actions: Vec<Action>) -> Option<Self> {
        let hand = state.hand()?;
        let vira = hand.vira();

        Some(Self {
            viewer,
            phase: phase.kind(),
            hand_number: hand.number(),
            hand: hand
                .hand(viewer)
                .iter()
                .enumerate()
                .map(|(index, &card)| HandCard {
                    index,
                    card,
                    power: power(card, vira),
                    manilha: is_manilha(card, vira),
                })
                .collect(),
            other_hand_size: hand.hand(viewer.other()).len(),
            vira,
            manilha: manilha_rank(vira.rank),
            table: hand
                .table()
                .cards()
                .iter()
                .map(|p| VisibleCard::of(p, viewer))
                .collect(),
            tricks: hand
                .tricks()
                .iter()
                .map(|t| VisibleTrick {
                    cards: t.cards.iter().map(|p| VisibleCard::of(p, viewer)).collect(),
                    leader: t.leader,
                    outcome: t.outcome,
                })
                .collect(),
            round_winners: hand.round_winners(),
            my_score: state.score(viewer),
            their_score: state.score(viewer.other()),
            stake: hand.stake(),
            pending: hand.betting().pending(),
            turn: hand.turn(),
            history: state
                .history()
                .iter()
                .map(|r| VisibleAction::of(r, viewer))
                .collect(),
            legal_actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_face_down_masked_for_other_side_only() {
        let played = PlayedCard::face_down(card("3♣"), Side::Player);
        assert_eq!(VisibleCard::of(&played, Side::Opponent).card, None);
        assert_eq!(VisibleCard::of(&played, Side::Player).card, Some(card("3♣")));

        let up = PlayedCard::face_up(card("4♦"), Side::Player);
        assert_eq!(VisibleCard::of(&up, Side::Opponent).card, Some(card("4♦")));
    }

    #[test]
    fn test_history_masking() {
        let record = ActionRecord::new(
            Side::Player,
            Action::Play {
                card: card("3♣"),
                face_down: true,
            },
            1,
            0,
        );
        let seen = VisibleAction::of(&record, Side::Opponent);
        assert_eq!(seen.kind, ActionKind::Play);
        assert!(seen.face_down);
        assert_eq!(seen.card, None);

        let bet = VisibleAction::of(&ActionRecord::new(Side::Player, Action::Truco, 1, 1), Side::Opponent);
        assert_eq!(bet.kind, ActionKind::Truco);
        assert_eq!(bet.card, None);
    }
}
