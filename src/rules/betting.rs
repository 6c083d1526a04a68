//! The truco betting ladder.
//!
//! A hand starts worth 1 point. Either side may ask for the next rung
//! (`1 → 3 → 6 → 9 → 12`) on its own turn; the other side then accepts,
//! runs, or raises to the rung after that. Restrictions:
//! - nobody proposes twice in a row (the last raiser must wait)
//! - a side at the hand-of-eleven threshold never proposes or raises
//! - nothing goes above 12

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, RunPayout, Side};

/// A rung of the ladder. The discriminant is the point value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stake {
    #[default]
    One = 1,
    Three = 3,
    Six = 6,
    Nine = 9,
    Twelve = 12,
}

impl Stake {
    pub const LADDER: [Stake; 5] = [
        Stake::One,
        Stake::Three,
        Stake::Six,
        Stake::Nine,
        Stake::Twelve,
    ];

    #[must_use]
    pub const fn points(self) -> u8 {
        self as u8
    }

    /// The rung above this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Stake> {
        match self {
            Stake::One => Some(Stake::Three),
            Stake::Three => Some(Stake::Six),
            Stake::Six => Some(Stake::Nine),
            Stake::Nine => Some(Stake::Twelve),
            Stake::Twelve => None,
        }
    }
}

/// An outstanding request to move the stake up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub by: Side,
    pub rung: Stake,
}

/// How a run settles: who takes the hand and for how much.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSettlement {
    pub winner: Side,
    pub points: u8,
}

/// Betting state for one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Betting {
    stake: Stake,
    last_raiser: Option<Side>,
    pending: Option<Proposal>,
}

impl Betting {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stake currently in force (ignores any unaccepted proposal).
    #[must_use]
    pub fn stake(&self) -> Stake {
        self.stake
    }

    #[must_use]
    pub fn last_raiser(&self) -> Option<Side> {
        self.last_raiser
    }

    #[must_use]
    pub fn pending(&self) -> Option<Proposal> {
        self.pending
    }

    /// Rung `side` would ask for with a fresh proposal, or why it can't.
    ///
    /// Turn order is the caller's concern; this checks only the ladder.
    pub fn check_propose(&self, side: Side, score: u8, threshold: u8) -> Result<Stake, EngineError> {
        if self.pending.is_some() {
            return Err(EngineError::ProposalOutstanding);
        }
        if score >= threshold {
            return Err(EngineError::HandOfEleven(side));
        }
        if self.last_raiser == Some(side) {
            return Err(EngineError::ConsecutiveRaise(side));
        }
        self.stake.next().ok_or(EngineError::StakeCeiling)
    }

    /// Rung `side` would counter with, or why it can't.
    pub fn check_raise(&self, side: Side, score: u8, threshold: u8) -> Result<Stake, EngineError> {
        let proposal = self.answerable_by(side)?;
        if score >= threshold {
            return Err(EngineError::HandOfEleven(side));
        }
        proposal.rung.next().ok_or(EngineError::StakeCeiling)
    }

    /// Ask for the next rung.
    pub fn propose(&mut self, side: Side, score: u8, threshold: u8) -> Result<Stake, EngineError> {
        let rung = self.check_propose(side, score, threshold)?;
        self.pending = Some(Proposal { by: side, rung });
        self.last_raiser = Some(side);
        Ok(rung)
    }

    /// Accept the outstanding proposal; its rung becomes the stake.
    pub fn accept(&mut self, side: Side) -> Result<Stake, EngineError> {
        let proposal = self.answerable_by(side)?;
        self.stake = proposal.rung;
        self.pending = None;
        self.last_raiser = Some(proposal.by);
        Ok(self.stake)
    }

    /// Counter a proposal: its rung is taken as accepted and a new proposal
    /// for the rung above is put to the other side.
    pub fn raise(&mut self, side: Side, score: u8, threshold: u8) -> Result<Stake, EngineError> {
        let rung = self.check_raise(side, score, threshold)?;
        if let Some(proposal) = self.pending {
            self.stake = proposal.rung;
        }
        self.pending = Some(Proposal { by: side, rung });
        self.last_raiser = Some(side);
        Ok(rung)
    }

    /// Refuse the outstanding proposal. The proposer takes the hand.
    pub fn run(&mut self, side: Side, payout: RunPayout) -> Result<RunSettlement, EngineError> {
        let proposal = self.answerable_by(side)?;
        let points = match payout {
            RunPayout::PreRaise => self.stake.points(),
            RunPayout::PostRaise => proposal.rung.points(),
        };
        self.pending = None;
        Ok(RunSettlement {
            winner: proposal.by,
            points,
        })
    }

    fn answerable_by(&self, side: Side) -> Result<Proposal, EngineError> {
        match self.pending {
            Some(proposal) if proposal.by != side => Ok(proposal),
            Some(_) => Err(EngineError::OutOfTurn(side)),
            None => Err(EngineError::NoProposal),
        }
    }
}
