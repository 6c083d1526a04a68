//! Cards, the deck, and vira-relative card power.
//!
//! - `Card`: immutable rank + suit with a stable id
//! - `create_deck`: shuffled 40-card deck
//! - `power`: strength of a card given the vira, including manilhas

pub mod card;
pub mod power;

pub use card::{create_deck, ordered_deck, Card, CardId, Rank, Suit, DECK_SIZE};
pub use power::{is_manilha, manilha_rank, power, sort_by_power, MANILHA_BASE};
