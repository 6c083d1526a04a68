//! Authoritative game state.
//!
//! ## HandState
//!
//! One deal: both hands, the vira, the open trick, resolved tricks and the
//! betting for the hand. Lives from the deal until the next deal replaces it.
//!
//! ## GameState
//!
//! Match-level state: scores, the current hand, who leads next, the action
//! history and summaries of finished hands, plus the RNG.
//!
//! Fields are read through accessors; writes are `pub(crate)` and are only
//! made by `engine::GameMachine` transitions.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::action::{Action, ActionRecord};
use super::error::EngineError;
use super::player::{Side, SideMap};
use super::rng::GameRng;
use crate::cards::Card;
use crate::rules::{Betting, PlayedCard, RoundWinner, Stake, Trick, TrickOutcome};

/// Cards dealt to each side per hand.
pub const HAND_SIZE: usize = 3;

/// The cards of one deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub player: [Card; HAND_SIZE],
    pub opponent: [Card; HAND_SIZE],
    pub vira: Card,
}

impl Deal {
    /// Deal from the top of a deck: three cards each, then the vira.
    pub fn from_deck(deck: &[Card]) -> Result<Self, EngineError> {
        let [p0, p1, p2, o0, o1, o2, vira, ..] = *deck else {
            return Err(EngineError::InvalidDeal(format!(
                "deck of {} cards is too short",
                deck.len()
            )));
        };
        let deal = Self {
            player: [p0, p1, p2],
            opponent: [o0, o1, o2],
            vira,
        };
        deal.validate()?;
        Ok(deal)
    }

    /// Every card must be distinct.
    pub fn validate(&self) -> Result<(), EngineError> {
        let cards: SmallVec<[Card; 7]> = self
            .player
            .iter()
            .chain(self.opponent.iter())
            .chain(std::iter::once(&self.vira))
            .copied()
            .collect();
        for (i, card) in cards.iter().enumerate() {
            if cards[i + 1..].contains(card) {
                return Err(EngineError::InvalidDeal(format!("{card} dealt twice")));
            }
        }
        Ok(())
    }
}

/// A resolved trick, kept in hand history. Never mutated after resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrick {
    /// Cards in play order.
    pub cards: SmallVec<[PlayedCard; 2]>,
    pub leader: Side,
    pub outcome: TrickOutcome,
}

/// How a hand ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandEnding {
    /// Decided by the tricks played.
    Tricks,
    /// A side ran from a proposal.
    Ran { by: Side },
}

/// Record of a finished hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSummary {
    pub number: u32,
    pub vira: Card,
    pub tricks: Vec<CompletedTrick>,
    pub round_winners: [RoundWinner; HAND_SIZE],
    /// Stake in force when the hand ended.
    pub stake: Stake,
    /// `None` for a pushed hand.
    pub winner: Option<Side>,
    pub points: u8,
    pub ending: HandEnding,
}

/// State of the hand in play.
#[derive(Clone, Debug)]
pub struct HandState {
    number: u32,
    vira: Card,
    hands: SideMap<SmallVec<[Card; HAND_SIZE]>>,
    table: Trick,
    tricks: Vec<CompletedTrick>,
    round_winners: [RoundWinner; HAND_SIZE],
    betting: Betting,
    first_leader: Side,
    trick_leader: Side,
    turn: Side,
}

impl HandState {
    #[must_use]
    pub fn new(number: u32, deal: Deal, leader: Side) -> Self {
        Self {
            number,
            vira: deal.vira,
            hands: SideMap::new(|side| match side {
                Side::Player => SmallVec::from_buf(deal.player),
                Side::Opponent => SmallVec::from_buf(deal.opponent),
            }),
            table: Trick::new(),
            tricks: Vec::with_capacity(HAND_SIZE),
            round_winners: [RoundWinner::Undecided; HAND_SIZE],
            betting: Betting::new(),
            first_leader: leader,
            trick_leader: leader,
            turn: leader,
        }
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn vira(&self) -> Card {
        self.vira
    }

    /// Cards still held by `side`, in deal order.
    #[must_use]
    pub fn hand(&self, side: Side) -> &[Card] {
        &self.hands[side]
    }

    #[must_use]
    pub fn table(&self) -> &Trick {
        &self.table
    }

    /// Resolved tricks, oldest first.
    #[must_use]
    pub fn tricks(&self) -> &[CompletedTrick] {
        &self.tricks
    }

    #[must_use]
    pub fn trick_outcomes(&self) -> SmallVec<[TrickOutcome; HAND_SIZE]> {
        self.tricks.iter().map(|t| t.outcome).collect()
    }

    #[must_use]
    pub fn round_winners(&self) -> [RoundWinner; HAND_SIZE] {
        self.round_winners
    }

    #[must_use]
    pub fn betting(&self) -> &Betting {
        &self.betting
    }

    #[must_use]
    pub fn stake(&self) -> Stake {
        self.betting.stake()
    }

    #[must_use]
    pub fn first_leader(&self) -> Side {
        self.first_leader
    }

    /// Side that led (or will lead) the open trick.
    #[must_use]
    pub fn trick_leader(&self) -> Side {
        self.trick_leader
    }

    /// Side due to play the next card.
    #[must_use]
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub(crate) fn betting_mut(&mut self) -> &mut Betting {
        &mut self.betting
    }

    pub(crate) fn set_turn(&mut self, side: Side) {
        self.turn = side;
    }

    /// Move `card` from `side`'s hand onto the table.
    pub(crate) fn play(&mut self, side: Side, card: Card, face_down: bool) -> Result<(), EngineError> {
        let pos = self.hands[side]
            .iter()
            .position(|&c| c == card)
            .ok_or(EngineError::CardNotInHand(side))?;
        let played = PlayedCard {
            card,
            side,
            face_down,
        };
        self.table.play(played)?;
        self.hands[side].remove(pos);
        Ok(())
    }

    /// Score the open trick, move it to history and clear the table.
    ///
    /// The winner leads next; after a draw the same side leads again.
    pub(crate) fn close_trick(&mut self) -> CompletedTrick {
        let outcome = self.table.outcome(self.vira);
        let completed = CompletedTrick {
            cards: self.table.take(),
            leader: self.trick_leader,
            outcome,
        };
        if let Some(slot) = self.round_winners.get_mut(self.tricks.len()) {
            *slot = outcome.into();
        }
        self.tricks.push(completed.clone());

        let next = outcome.winner().unwrap_or(self.trick_leader);
        self.trick_leader = next;
        self.turn = next;
        completed
    }

    pub(crate) fn summarize(&self, winner: Option<Side>, points: u8, ending: HandEnding) -> HandSummary {
        HandSummary {
            number: self.number,
            vira: self.vira,
            tricks: self.tricks.clone(),
            round_winners: self.round_winners,
            stake: self.betting.stake(),
            winner,
            points,
            ending,
        }
    }
}

/// Full match state.
#[derive(Clone, Debug)]
pub struct GameState {
    scores: SideMap<u8>,
    hand: Option<HandState>,
    next_leader: Side,
    hands_dealt: u32,
    history: Vector<ActionRecord>,
    hand_history: Vector<HandSummary>,
    rng: GameRng,
    sequence: u32,
}

impl GameState {
    #[must_use]
    pub fn new(seed: u64, first_leader: Side) -> Self {
        Self::with_rng(GameRng::new(seed), first_leader)
    }

    pub(crate) fn with_rng(rng: GameRng, first_leader: Side) -> Self {
        Self {
            scores: SideMap::with_value(0),
            hand: None,
            next_leader: first_leader,
            hands_dealt: 0,
            history: Vector::new(),
            hand_history: Vector::new(),
            rng,
            sequence: 0,
        }
    }

    #[must_use]
    pub fn score(&self, side: Side) -> u8 {
        self.scores[side]
    }

    #[must_use]
    pub fn scores(&self) -> &SideMap<u8> {
        &self.scores
    }

    /// Current (or just finished) hand.
    #[must_use]
    pub fn hand(&self) -> Option<&HandState> {
        self.hand.as_ref()
    }

    /// Side that leads the first trick of the next deal.
    #[must_use]
    pub fn next_leader(&self) -> Side {
        self.next_leader
    }

    #[must_use]
    pub fn hands_dealt(&self) -> u32 {
        self.hands_dealt
    }

    /// Every applied action of the match, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    /// Finished hands, oldest first.
    #[must_use]
    pub fn hand_history(&self) -> &Vector<HandSummary> {
        &self.hand_history
    }

    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    pub(crate) fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub(crate) fn hand_mut(&mut self) -> Option<&mut HandState> {
        self.hand.as_mut()
    }

    pub(crate) fn start_hand(&mut self, deal: Deal) -> &HandState {
        self.hands_dealt += 1;
        let hand = HandState::new(self.hands_dealt, deal, self.next_leader);
        self.hand.insert(hand)
    }

    pub(crate) fn set_next_leader(&mut self, side: Side) {
        self.next_leader = side;
    }

    /// Add points to a side, returning its new score.
    pub(crate) fn award(&mut self, side: Side, points: u8) -> u8 {
        let score = &mut self.scores[side];
        *score = score.saturating_add(points);
        *score
    }

    pub(crate) fn record(&mut self, side: Side, action: Action) {
        let hand = self.hand.as_ref().map_or(0, HandState::number);
        self.history
            .push_back(ActionRecord::new(side, action, hand, self.sequence));
        self.sequence += 1;
    }

    pub(crate) fn push_summary(&mut self, summary: HandSummary) {
        self.hand_history.push_back(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn deal() -> Deal {
        Deal {
            player: [card("4♦"), card("7♥"), card("A♣")],
            opponent: [card("Q♦"), card("3♠"), card("2♥")],
            vira: card("5♦"),
        }
    }

    #[test]
    fn test_deal_from_deck() {
        let deck: Vec<Card> = ["4♦", "7♥", "A♣", "Q♦", "3♠", "2♥", "5♦", "K♣"]
            .iter()
            .map(|s| card(s))
            .collect();
        assert_eq!(Deal::from_deck(&deck).unwrap(), deal());
        assert!(Deal::from_deck(&deck[..6]).is_err());
    }

    #[test]
    fn test_deal_rejects_duplicates() {
        let mut bad = deal();
        bad.vira = card("4♦");
        assert!(matches!(bad.validate(), Err(EngineError::InvalidDeal(_))));
    }

    #[test]
    fn test_hand_play_and_close() {
        let mut hand = HandState::new(1, deal(), Side::Player);
        assert_eq!(hand.turn(), Side::Player);

        hand.play(Side::Player, card("4♦"), false).unwrap();
        assert_eq!(hand.hand(Side::Player).len(), 2);
        assert_eq!(
            hand.play(Side::Opponent, card("4♦"), false),
            Err(EngineError::CardNotInHand(Side::Opponent))
        );
        hand.play(Side::Opponent, card("Q♦"), false).unwrap();

        let trick = hand.close_trick();
        assert_eq!(trick.outcome, TrickOutcome::Won(Side::Opponent));
        assert_eq!(trick.leader, Side::Player);
        assert!(hand.table().is_empty());
        assert_eq!(hand.round_winners()[0], RoundWinner::Opponent);
        assert_eq!(hand.turn(), Side::Opponent);
        assert_eq!(hand.trick_leader(), Side::Opponent);
    }

    #[test]
    fn test_drawn_trick_keeps_leader() {
        let d = Deal {
            player: [card("7♥"), card("4♦"), card("A♣")],
            opponent: [card("7♠"), card("3♠"), card("2♥")],
            vira: card("5♦"),
        };
        let mut hand = HandState::new(1, d, Side::Opponent);
        hand.play(Side::Opponent, card("7♠"), false).unwrap();
        hand.play(Side::Player, card("7♥"), false).unwrap();

        assert_eq!(hand.close_trick().outcome, TrickOutcome::Draw);
        assert_eq!(hand.turn(), Side::Opponent);
    }

    #[test]
    fn test_game_state_award_and_record() {
        let mut state = GameState::new(42, Side::Player);
        assert_eq!(state.award(Side::Opponent, 3), 3);
        assert_eq!(state.award(Side::Opponent, 250), u8::MAX);

        state.start_hand(deal());
        state.record(Side::Player, Action::Truco);
        state.record(Side::Opponent, Action::Accept);

        assert_eq!(state.hands_dealt(), 1);
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[1].sequence, 1);
        assert_eq!(state.history()[1].hand, 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = GameState::new(42, Side::Player);
        state.start_hand(deal());
        let snapshot = state.clone();

        state.record(Side::Player, Action::Truco);
        assert_eq!(snapshot.history().len(), 0);
        assert_eq!(state.history().len(), 1);
    }
}
