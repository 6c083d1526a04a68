//! Deterministic random number generation for dealing and fallback play.
//!
//! A match seeded with the same value deals the same hands and, when the
//! decision provider fails, falls back to the same actions. The RNG state
//! can be captured in O(1) and restored, so a snapshot of the game keeps its
//! future shuffles.
//!
//! ```
//! use truco_engine::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(a.gen_range_usize(0..40), b.gen_range_usize(0..40));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded ChaCha8 RNG.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place (Fisher-Yates, uniform over permutations).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose an index with weighted probability.
    ///
    /// Weights do not need to sum to 1.0. Returns `None` if weights are
    /// empty or all zero.
    pub fn choose_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().sum();
        if weights.is_empty() || total <= 0.0 {
            return None;
        }

        let mut threshold = self.inner.gen::<f32>() * total;

        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            threshold -= weight;
            if threshold <= 0.0 {
                return Some(i);
            }
        }

        // Floating point edge case - last non-zero weight
        weights.iter().rposition(|&w| w > 0.0)
    }

    /// Get the current state for checkpointing.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
