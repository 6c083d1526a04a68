//! Match configuration.
//!
//! The rules themselves are fixed Truco Paulista, but a few house-rule
//! points are left configurable:
//! - `unresolved_tie` / `all_draw`: who takes a hand whose tricks never
//!   single out a winner
//! - `run_payout`: whether running from a raise pays the stake before or
//!   after the raise
//! - `lead_rule`: who leads the first trick of the next hand

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::player::Side;

/// Who leads the first trick of the next hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadRule {
    /// Lead alternates every hand.
    #[default]
    Alternate,
    /// The loser of the previous hand leads. A pushed hand alternates.
    LoserLeads,
}

/// Resolution for a hand whose tricks do not decide a winner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieRule {
    /// The side that led the first trick takes the hand.
    FirstLeaderWins,
    /// Nobody scores.
    Push,
}

/// Stake paid when a side runs from an outstanding raise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPayout {
    /// The stake in force before the unaccepted raise.
    #[default]
    PreRaise,
    /// The stake that was being proposed.
    PostRaise,
}

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrucoConfig {
    /// Points needed to win the match.
    pub target_score: u8,

    /// Score at which a side may no longer propose or raise.
    pub hand_of_eleven: u8,

    /// Seed for shuffling and fallback play.
    pub seed: u64,

    /// Who leads the first trick of the first hand.
    pub first_leader: Side,

    pub lead_rule: LeadRule,

    /// Applied when all three tricks are played without a decision
    /// (other than all three drawing).
    pub unresolved_tie: TieRule,

    /// Applied when all three tricks draw.
    pub all_draw: TieRule,

    pub run_payout: RunPayout,

    /// Upper bound on a single decision request before the fallback policy
    /// takes over.
    pub decision_timeout: Duration,

    /// Simulated pause before the opponent's decision is requested.
    pub thinking_delay: Duration,
}

impl Default for TrucoConfig {
    fn default() -> Self {
        Self {
            target_score: 12,
            hand_of_eleven: 11,
            seed: 42,
            first_leader: Side::Player,
            lead_rule: LeadRule::Alternate,
            unresolved_tie: TieRule::FirstLeaderWins,
            all_draw: TieRule::Push,
            run_payout: RunPayout::PreRaise,
            decision_timeout: Duration::from_secs(10),
            thinking_delay: Duration::ZERO,
        }
    }
}

impl TrucoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_target_score(mut self, target: u8) -> Self {
        self.target_score = target;
        self
    }

    #[must_use]
    pub fn with_hand_of_eleven(mut self, threshold: u8) -> Self {
        self.hand_of_eleven = threshold;
        self
    }

    #[must_use]
    pub fn with_first_leader(mut self, side: Side) -> Self {
        self.first_leader = side;
        self
    }

    #[must_use]
    pub fn with_lead_rule(mut self, rule: LeadRule) -> Self {
        self.lead_rule = rule;
        self
    }

    #[must_use]
    pub fn with_unresolved_tie(mut self, rule: TieRule) -> Self {
        self.unresolved_tie = rule;
        self
    }

    #[must_use]
    pub fn with_all_draw(mut self, rule: TieRule) -> Self {
        self.all_draw = rule;
        self
    }

    #[must_use]
    pub fn with_run_payout(mut self, payout: RunPayout) -> Self {
        self.run_payout = payout;
        self
    }

    #[must_use]
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay = delay;
        self
    }

    /// Check the configuration is playable.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.target_score == 0 {
            return Err(EngineError::InvalidConfig(
                "target score must be positive".into(),
            ));
        }
        if self.hand_of_eleven >= self.target_score {
            return Err(EngineError::InvalidConfig(format!(
                "hand of eleven threshold {} must be below target {}",
                self.hand_of_eleven, self.target_score
            )));
        }
        if self.decision_timeout.is_zero() {
            return Err(EngineError::InvalidConfig(
                "decision timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}
