//! Local policy used when the decision provider fails or times out.
//!
//! The policy only ever picks from the legal actions it is given, so its
//! choice can be applied without further validation.

use crate::core::{Action, GameRng};

/// Picks an opponent action without the provider.
pub trait FallbackPolicy: Send {
    /// Choose one of `legal`. `None` only when `legal` is empty.
    fn choose(&mut self, legal: &[Action], rng: &mut GameRng) -> Option<Action>;
}

/// Weighted random choice by action kind.
///
/// Face-down plays get their own weight, zero by default: a fallback should
/// not throw away cards.
#[derive(Clone, Debug)]
pub struct WeightedFallback {
    pub play: f32,
    pub face_down: f32,
    pub truco: f32,
    pub accept: f32,
    pub raise: f32,
    pub run: f32,
}

impl Default for WeightedFallback {
    fn default() -> Self {
        Self {
            play: 1.0,
            face_down: 0.0,
            truco: 0.15,
            accept: 0.7,
            raise: 0.1,
            run: 0.2,
        }
    }
}

impl WeightedFallback {
    #[must_use]
    pub fn weight(&self, action: &Action) -> f32 {
        match action {
            Action::Play { face_down: false, .. } => self.play,
            Action::Play { face_down: true, .. } => self.face_down,
            Action::Truco => self.truco,
            Action::Accept => self.accept,
            Action::Raise => self.raise,
            Action::Run => self.run,
        }
    }
}

impl FallbackPolicy for WeightedFallback {
    fn choose(&mut self, legal: &[Action], rng: &mut GameRng) -> Option<Action> {
        let weights: Vec<f32> = legal.iter().map(|a| self.weight(a)).collect();
        rng.choose_weighted(&weights)
            .and_then(|i| legal.get(i).copied())
            .or_else(|| legal.first().copied())
    }
}
