//! Turning untrusted provider responses into legal actions.
//!
//! A response is never rejected. When it names something the opponent may
//! not do right now, it is mapped to the closest legal action and the
//! mapping is reported as a [`Coercion`]:
//!
//! | situation          | asked for          | applied                         |
//! |--------------------|--------------------|---------------------------------|
//! | own turn           | `PLAY` bad index   | first card, face-up             |
//! | own turn           | `ACCEPT`/`RUN`     | first card, face-up             |
//! | own turn           | `RAISE`            | `TRUCO` if allowed, else first card |
//! | own turn           | blocked `TRUCO`    | first card, face-up             |
//! | answering          | `PLAY`             | `ACCEPT`                        |
//! | answering          | `TRUCO`            | `RAISE` if allowed, else `ACCEPT` |
//! | answering          | blocked `RAISE`    | `ACCEPT`                        |

use rustc_hash::FxHashMap;

use super::provider::DecisionResponse;
use crate::cards::Card;
use crate::core::{Action, ActionKind, EngineError, Side};
use crate::rules::Stake;

/// Why a proposal or counter was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RaiseBlock {
    HandOfEleven,
    StakeCeiling,
    ConsecutiveRaise,
    NotAllowed,
}

impl From<&EngineError> for RaiseBlock {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::HandOfEleven(_) => RaiseBlock::HandOfEleven,
            EngineError::StakeCeiling => RaiseBlock::StakeCeiling,
            EngineError::ConsecutiveRaise(_) => RaiseBlock::ConsecutiveRaise,
            _ => RaiseBlock::NotAllowed,
        }
    }
}

/// How a response was changed before it was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coercion {
    MissingCardIndex,
    CardIndexOutOfRange { index: usize, hand_size: usize },
    RaiseBlocked(RaiseBlock),
    PlayWhileResponding,
    NothingToAnswer,
    TrucoAsRaise,
    RaiseAsTruco,
}

impl Coercion {
    /// Stable key for counting.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Coercion::MissingCardIndex => "missing_card_index",
            Coercion::CardIndexOutOfRange { .. } => "card_index_out_of_range",
            Coercion::RaiseBlocked(RaiseBlock::HandOfEleven) => "raise_blocked_hand_of_eleven",
            Coercion::RaiseBlocked(RaiseBlock::StakeCeiling) => "raise_blocked_stake_ceiling",
            Coercion::RaiseBlocked(RaiseBlock::ConsecutiveRaise) => "raise_blocked_consecutive",
            Coercion::RaiseBlocked(RaiseBlock::NotAllowed) => "raise_blocked",
            Coercion::PlayWhileResponding => "play_while_responding",
            Coercion::NothingToAnswer => "nothing_to_answer",
            Coercion::TrucoAsRaise => "truco_as_raise",
            Coercion::RaiseAsTruco => "raise_as_truco",
        }
    }
}

/// What the acting side may do right now.
#[derive(Clone, Debug)]
pub struct Legality<'a> {
    pub side: Side,
    /// Answering a proposal rather than taking a turn.
    pub responding: bool,
    pub hand: &'a [Card],
    /// Result of a fresh proposal.
    pub propose: Result<Stake, EngineError>,
    /// Result of countering the outstanding proposal.
    pub raise: Result<Stake, EngineError>,
}

/// A response mapped onto a legal action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validated {
    pub action: Action,
    pub coercion: Option<Coercion>,
}

impl Validated {
    fn exact(action: Action) -> Self {
        Self {
            action,
            coercion: None,
        }
    }

    fn coerced(action: Action, coercion: Coercion) -> Self {
        Self {
            action,
            coercion: Some(coercion),
        }
    }
}

/// Map `response` to a legal action.
///
/// Fails only if a card must be played and the hand is empty, which the
/// turn structure never allows.
pub fn coerce(response: &DecisionResponse, legality: &Legality<'_>) -> Result<Validated, EngineError> {
    let first_card = |coercion: Coercion| -> Result<Validated, EngineError> {
        let card = *legality
            .hand
            .first()
            .ok_or(EngineError::NoLegalAction(legality.side))?;
        Ok(Validated::coerced(
            Action::Play {
                card,
                face_down: false,
            },
            coercion,
        ))
    };

    if legality.responding {
        let validated = match response.action {
            ActionKind::Accept => Validated::exact(Action::Accept),
            ActionKind::Run | ActionKind::Fold => Validated::exact(Action::Run),
            ActionKind::Raise => match &legality.raise {
                Ok(_) => Validated::exact(Action::Raise),
                Err(e) => Validated::coerced(Action::Accept, Coercion::RaiseBlocked(e.into())),
            },
            ActionKind::Truco => match &legality.raise {
                Ok(_) => Validated::coerced(Action::Raise, Coercion::TrucoAsRaise),
                Err(e) => Validated::coerced(Action::Accept, Coercion::RaiseBlocked(e.into())),
            },
            ActionKind::Play => Validated::coerced(Action::Accept, Coercion::PlayWhileResponding),
        };
        return Ok(validated);
    }

    match response.action {
        ActionKind::Play => {
            let Some(index) = response.card_index else {
                return first_card(Coercion::MissingCardIndex);
            };
            match legality.hand.get(index) {
                Some(&card) => Ok(Validated::exact(Action::Play {
                    card,
                    face_down: response.face_down,
                })),
                None => first_card(Coercion::CardIndexOutOfRange {
                    index,
                    hand_size: legality.hand.len(),
                }),
            }
        }
        ActionKind::Truco => match &legality.propose {
            Ok(_) => Ok(Validated::exact(Action::Truco)),
            Err(e) => first_card(Coercion::RaiseBlocked(e.into())),
        },
        ActionKind::Raise => match &legality.propose {
            Ok(_) => Ok(Validated::coerced(Action::Truco, Coercion::RaiseAsTruco)),
            Err(e) => first_card(Coercion::RaiseBlocked(e.into())),
        },
        ActionKind::Accept | ActionKind::Run | ActionKind::Fold => first_card(Coercion::NothingToAnswer),
    }
}

/// Counters for the decision boundary.
#[derive(Clone, Debug, Default)]
pub struct DecisionStats {
    /// Requests handed to the provider.
    pub requests: u32,
    /// Decisions applied, fallbacks included.
    pub applied: u32,
    /// Provider failures or timeouts replaced by the fallback policy.
    pub fallbacks: u32,
    /// Responses dropped for carrying an outdated ticket.
    pub stale: u32,
    coercions: FxHashMap<&'static str, u32>,
}

impl DecisionStats {
    pub fn record_coercion(&mut self, coercion: &Coercion) {
        *self.coercions.entry(coercion.label()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn coercions(&self, label: &str) -> u32 {
        self.coercions.get(label).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_coercions(&self) -> u32 {
        self.coercions.values().sum()
    }
}
