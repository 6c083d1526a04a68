//! Async driver tying a `GameMachine` to a `DecisionProvider`.
//!
//! The controller holds the machine mutably across the provider call, so
//! only one opponent request can be outstanding at a time. A slow provider
//! is cut off after `decision_timeout` and the machine's fallback policy
//! answers instead. A request dispatched outside the controller is left
//! alone until its owner resolves or cancels it.

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::machine::{AppliedDecision, GameMachine};
use super::phase::{DecisionTicket, MatchResult, Phase, RequestStatus, RoundReport};
use crate::core::EngineError;
use crate::decision::{DecisionError, DecisionProvider};

/// What one automatic step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A new hand was dealt.
    Dealt,
    /// Left a `RoundResult`; carries what it reported.
    Round(RoundReport),
    /// The opponent acted.
    Decided(AppliedDecision),
    /// Nothing to do until the player acts.
    AwaitingPlayer,
    Finished(MatchResult),
}

pub struct Controller<P> {
    machine: GameMachine,
    provider: P,
    /// Ticket this controller is waiting on; survives a dropped call.
    awaiting: Option<DecisionTicket>,
}

impl<P: DecisionProvider> Controller<P> {
    pub fn new(machine: GameMachine, provider: P) -> Self {
        Self {
            machine,
            provider,
            awaiting: None,
        }
    }

    #[must_use]
    pub fn machine(&self) -> &GameMachine {
        &self.machine
    }

    /// For player actions.
    pub fn machine_mut(&mut self) -> &mut GameMachine {
        &mut self.machine
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn into_inner(self) -> GameMachine {
        self.machine
    }

    /// Ask the provider for the opponent's move and apply it.
    ///
    /// `Ok(None)` when the opponent is not due to act.
    pub async fn drive_opponent(&mut self) -> Result<Option<AppliedDecision>, EngineError> {
        let in_flight = self
            .machine
            .phase()
            .pending()
            .filter(|p| p.status == RequestStatus::InFlight)
            .map(|p| p.ticket);
        match in_flight {
            // Our own earlier call was dropped before it resolved
            Some(ticket) if self.awaiting == Some(ticket) => {
                self.machine.cancel_decision();
            }
            Some(ticket) => {
                debug!(ticket = ticket.0, "request outstanding elsewhere");
                return Ok(None);
            }
            None => {}
        }
        self.awaiting = None;

        let Some(request) = self.machine.dispatch_decision() else {
            return Ok(None);
        };
        let ticket = request.ticket;
        self.awaiting = Some(ticket);
        let config = self.machine.config();
        let (delay, limit) = (config.thinking_delay, config.decision_timeout);

        if !delay.is_zero() {
            sleep(delay).await;
        }
        let outcome = match timeout(limit, self.provider.decide(request)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(ticket = ticket.0, timeout_ms = limit.as_millis() as u64, "decision timed out");
                Err(DecisionError::Timeout)
            }
        };

        let applied = self.machine.resolve_decision(ticket, outcome);
        self.awaiting = None;
        applied.map(Some)
    }

    /// Take one automatic step: deal, leave a round result, or let the
    /// opponent act.
    pub async fn step(&mut self) -> Result<Tick, EngineError> {
        let tick = match self.machine.phase() {
            Phase::Dealing => {
                self.machine.deal()?;
                Tick::Dealt
            }
            Phase::RoundResult(report) => {
                let report = report.clone();
                self.machine.advance()?;
                Tick::Round(report)
            }
            Phase::AiThinking(_) | Phase::TrucoProposalPlayer(_) => match self.drive_opponent().await? {
                Some(applied) => Tick::Decided(applied),
                None => Tick::AwaitingPlayer,
            },
            Phase::PlayerTurn | Phase::TrucoProposalAi => Tick::AwaitingPlayer,
            Phase::GameOver(result) => Tick::Finished(result.clone()),
        };
        debug!(?tick, "step");
        Ok(tick)
    }

    /// Step until the player must act or the match is over.
    pub async fn run_until_player(&mut self) -> Result<Tick, EngineError> {
        loop {
            match self.step().await? {
                tick @ (Tick::AwaitingPlayer | Tick::Finished(_)) => return Ok(tick),
                _ => {}
            }
        }
    }
}
