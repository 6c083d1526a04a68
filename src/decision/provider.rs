//! The decision provider contract.
//!
//! The engine asks an external provider (a remote model, a local heuristic,
//! a second human) for the opponent's move. Requests carry the opponent's
//! `GameView`; responses are untrusted and are validated by the engine
//! before anything is applied.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::view::GameView;
use crate::core::ActionKind;
use crate::engine::phase::{DecisionContext, DecisionTicket};

/// Errors a provider may report instead of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("decision timed out")]
    Timeout,
    #[error("decision provider unavailable: {0}")]
    Unavailable(String),
    #[error("malformed decision: {0}")]
    Malformed(String),
}

/// A request for the opponent's next action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub ticket: DecisionTicket,
    pub context: DecisionContext,
    pub view: GameView,
}

impl DecisionRequest {
    /// Compact binary form for out-of-process providers.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

/// A provider's answer, e.g. `{"action": "PLAY", "cardIndex": 1}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub action: ActionKind,
    /// Index into the opponent's hand; only meaningful for `PLAY`.
    #[serde(default)]
    pub card_index: Option<usize>,
    #[serde(default)]
    pub face_down: bool,
    /// Table talk. Passed through untouched.
    #[serde(default)]
    pub flavor: Option<String>,
}

impl DecisionResponse {
    #[must_use]
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            card_index: None,
            face_down: false,
            flavor: None,
        }
    }

    #[must_use]
    pub fn play(card_index: usize) -> Self {
        Self {
            card_index: Some(card_index),
            ..Self::new(ActionKind::Play)
        }
    }

    #[must_use]
    pub fn face_down(mut self) -> Self {
        self.face_down = true;
        self
    }

    #[must_use]
    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }
}

/// Source of opponent decisions.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, DecisionError>;
}

#[async_trait]
impl<P: DecisionProvider + ?Sized> DecisionProvider for Arc<P> {
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        (**self).decide(request).await
    }
}

#[async_trait]
impl<P: DecisionProvider + ?Sized> DecisionProvider for Box<P> {
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        (**self).decide(request).await
    }
}
