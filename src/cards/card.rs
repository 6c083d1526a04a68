//! The 40-card Truco deck.
//!
//! ## Ordering
//!
//! `Rank` variants are declared in the base strength order
//! `4 5 6 7 Q J K A 2 3`, and `Suit` variants in the manilha tie-break
//! order `♦ ♠ ♥ ♣`. The derived `Ord` on each therefore matches game
//! strength, but `Card` itself deliberately has no ordering: the strength
//! of a card depends on the vira (see `cards::power`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, GameRng};

/// Number of cards in a Truco deck.
pub const DECK_SIZE: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Diamonds,
    Spades,
    Hearts,
    Clubs,
}

impl Suit {
    /// All suits, weakest manilha first.
    pub const ALL: [Suit; 4] = [Suit::Diamonds, Suit::Spades, Suit::Hearts, Suit::Clubs];

    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Suit::Diamonds => '♦',
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '♦' | 'D' | 'd' => Some(Suit::Diamonds),
            '♠' | 'S' | 's' => Some(Suit::Spades),
            '♥' | 'H' | 'h' => Some(Suit::Hearts),
            '♣' | 'C' | 'c' => Some(Suit::Clubs),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Four,
    Five,
    Six,
    Seven,
    Queen,
    Jack,
    King,
    Ace,
    Two,
    Three,
}

impl Rank {
    /// All ranks in base strength order.
    pub const ALL: [Rank; 10] = [
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Queen,
        Rank::Jack,
        Rank::King,
        Rank::Ace,
        Rank::Two,
        Rank::Three,
    ];

    /// Position in the base order (0 for 4, 9 for 3).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// The following rank in base order, wrapping from 3 back to 4.
    #[must_use]
    pub const fn next(self) -> Rank {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Queen => "Q",
            Rank::Jack => "J",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.symbol().eq_ignore_ascii_case(s))
    }
}

/// Stable card identifier, used only to correlate cards with a UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u8);

/// An immutable playing card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            id: CardId(rank.index() * 4 + suit.index()),
            rank,
            suit,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// Parses `"4♦"`, `"QH"`, `"a♣"` and similar.
impl FromStr for Card {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let suit_char = chars
            .next_back()
            .ok_or_else(|| EngineError::ParseCard(s.to_string()))?;
        let suit = Suit::from_char(suit_char).ok_or_else(|| EngineError::ParseCard(s.to_string()))?;
        let rank =
            Rank::from_symbol(chars.as_str()).ok_or_else(|| EngineError::ParseCard(s.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

/// All 40 cards in rank-then-suit order.
#[must_use]
pub fn ordered_deck() -> Vec<Card> {
    Rank::ALL
        .into_iter()
        .flat_map(|rank| Suit::ALL.into_iter().map(move |suit| Card::new(rank, suit)))
        .collect()
}

/// A freshly shuffled 40-card deck.
pub fn create_deck(rng: &mut GameRng) -> Vec<Card> {
    let mut deck = ordered_deck();
    rng.shuffle(&mut deck);
    deck
}
