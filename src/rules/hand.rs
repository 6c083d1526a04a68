//! Hand resolution over up to three tricks.
//!
//! The verdict is a decision table over the resolved trick outcomes, read
//! oldest first (`W(x)` is a trick won by `x`, `D` a drawn trick):
//!
//! | tricks            | verdict                                   |
//! |-------------------|-------------------------------------------|
//! | `W(x) W(x)`       | `x` (two outright)                        |
//! | `D W(x)`          | `x` (first drawn, second decides)         |
//! | `W(x) D`          | `x` (second drawn, first decides)         |
//! | `W(x) W(y) W(z)`  | `z` (takes two of three)                  |
//! | `W(x) W(y) D`     | `x` (first decisive trick)                |
//! | `D D W(x)`        | `x`                                       |
//! | `D D D`           | `all_draw` rule                           |
//! | one or two tricks otherwise | pending                         |
//!
//! Any other three-trick sequence cannot occur (the hand ends earlier) and
//! falls back to counting wins, then the `unresolved_tie` rule.

use serde::{Deserialize, Serialize};

use super::trick::TrickOutcome;
use crate::core::{Side, TieRule};

/// Per-trick slot of a hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundWinner {
    Player,
    Opponent,
    Draw,
    #[default]
    Undecided,
}

impl From<TrickOutcome> for RoundWinner {
    fn from(outcome: TrickOutcome) -> Self {
        match outcome {
            TrickOutcome::Won(Side::Player) => RoundWinner::Player,
            TrickOutcome::Won(Side::Opponent) => RoundWinner::Opponent,
            TrickOutcome::Draw => RoundWinner::Draw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandVerdict {
    /// More tricks are needed.
    Pending,
    Won(Side),
    /// Hand over with no winner; nobody scores.
    Push,
}

/// Tie-break inputs for hands the tricks alone do not decide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TieBreak {
    /// Side that led the first trick of the hand.
    pub first_leader: Side,
    pub unresolved: TieRule,
    pub all_draw: TieRule,
}

impl TieBreak {
    fn apply(&self, rule: TieRule) -> HandVerdict {
        match rule {
            TieRule::FirstLeaderWins => HandVerdict::Won(self.first_leader),
            TieRule::Push => HandVerdict::Push,
        }
    }
}

/// Evaluate a hand from its resolved tricks, oldest first.
#[must_use]
pub fn evaluate_hand(tricks: &[TrickOutcome], tie: &TieBreak) -> HandVerdict {
    use TrickOutcome::{Draw as D, Won as W};

    match *tricks {
        [] | [_] => HandVerdict::Pending,

        [W(x), W(y)] if x == y => HandVerdict::Won(x),
        [W(_), W(_)] => HandVerdict::Pending,
        [D, W(x)] | [W(x), D] => HandVerdict::Won(x),
        [D, D] => HandVerdict::Pending,

        [W(x), W(y), W(z)] if x != y => HandVerdict::Won(z),
        [W(x), W(y), D] if x != y => HandVerdict::Won(x),
        [D, D, W(x)] => HandVerdict::Won(x),
        [D, D, D] => tie.apply(tie.all_draw),

        _ => by_count(tricks, tie),
    }
}

fn by_count(tricks: &[TrickOutcome], tie: &TieBreak) -> HandVerdict {
    let wins = |side: Side| {
        tricks
            .iter()
            .filter(|t| t.winner() == Some(side))
            .count()
    };
    let (player, opponent) = (wins(Side::Player), wins(Side::Opponent));

    match player.cmp(&opponent) {
        std::cmp::Ordering::Greater => HandVerdict::Won(Side::Player),
        std::cmp::Ordering::Less => HandVerdict::Won(Side::Opponent),
        std::cmp::Ordering::Equal => tie.apply(tie.unresolved),
    }
}
