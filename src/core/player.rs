//! Side identification and per-side data storage.
//!
//! ## Side
//!
//! Truco Paulista here is always heads-up: the human `Player` against the
//! computer `Opponent`.
//!
//! ## SideMap
//!
//! Fixed two-slot storage indexed by `Side`, used for scores, hands and
//! anything else that is tracked once per side.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two seats at the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The human seat.
    Player,
    /// The computer seat, driven by an external decision provider.
    Opponent,
}

impl Side {
    /// Both sides, in index order.
    pub const ALL: [Side; 2] = [Side::Player, Side::Opponent];

    /// The other seat.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Storage index (0 for the player, 1 for the opponent).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use truco_engine::core::{Side, SideMap};
///
/// let mut score: SideMap<u8> = SideMap::with_value(0);
/// score[Side::Opponent] += 3;
///
/// assert_eq!(score[Side::Player], 0);
/// assert_eq!(score[Side::Opponent], 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::Player), factory(Side::Opponent)],
        }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a map with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (Side, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::ALL.into_iter().zip(self.data.iter())
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
