//! Card strength relative to the vira.
//!
//! Power is always derived from `(card, vira)` and never stored on a card:
//! - non-manilha cards score their base-order index, 0..=9
//! - manilhas score `MANILHA_BASE + suit index`, 100..=103, clubs (the
//!   "zap") being the strongest

use super::card::{Card, Rank};

/// Power floor for manilhas; every manilha outranks every other card.
pub const MANILHA_BASE: u8 = 100;

/// The trump rank for a hand: the rank after the vira's, cyclically.
#[must_use]
pub const fn manilha_rank(vira: Rank) -> Rank {
    vira.next()
}

#[must_use]
pub fn is_manilha(card: Card, vira: Card) -> bool {
    card.rank == manilha_rank(vira.rank)
}

/// Strength of `card` in a hand turned up with `vira`.
#[must_use]
pub fn power(card: Card, vira: Card) -> u8 {
    if is_manilha(card, vira) {
        MANILHA_BASE + card.suit.index()
    } else {
        card.rank.index()
    }
}

/// Sort cards weakest first for display. Not authoritative game state.
pub fn sort_by_power(cards: &mut [Card], vira: Card) {
    cards.sort_by_key(|&c| (power(c, vira), c.suit));
}
