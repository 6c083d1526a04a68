//! The authoritative game state machine.
//!
//! `GameMachine` owns the match and is the only thing that mutates it. The
//! player acts through direct calls (`play`, `truco`, ...). The opponent
//! acts only through the decision boundary: `dispatch_decision` hands out a
//! ticketed request, and `resolve_decision` applies the answer for that
//! ticket after making it legal. Every rejected call leaves the state as it
//! was.
//!
//! ```
//! use truco_engine::{GameMachine, PhaseKind, TrucoConfig};
//!
//! let mut machine = GameMachine::new(TrucoConfig::default()).unwrap();
//! machine.deal().unwrap();
//! assert_eq!(machine.phase().kind(), PhaseKind::PlayerTurn);
//! machine.play(0, false).unwrap();
//! assert_eq!(machine.phase().kind(), PhaseKind::AiThinking);
//! ```

use tracing::{debug, info, warn};

use super::phase::{
    DecisionContext, DecisionTicket, MatchResult, PendingDecision, Phase, PhaseKind, RequestStatus,
    RoundReport,
};
use crate::cards::create_deck;
use crate::core::{
    Action, CompletedTrick, Deal, EngineError, GameState, HandEnding, HandState, LeadRule, Side,
    TrucoConfig,
};
use crate::decision::{
    coerce, Coercion, DecisionError, DecisionRequest, DecisionResponse, DecisionStats,
    FallbackPolicy, GameView, Legality, WeightedFallback,
};
use crate::rules::{evaluate_hand, HandVerdict, TieBreak};

/// What `resolve_decision` applied for the opponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedDecision {
    pub ticket: DecisionTicket,
    pub action: Action,
    /// Set when the provider's answer had to be changed.
    pub coercion: Option<Coercion>,
    /// The provider failed and the fallback policy chose.
    pub fell_back: bool,
    pub flavor: Option<String>,
}

/// A single match of truco paulista between the player and the opponent.
pub struct GameMachine {
    config: TrucoConfig,
    state: GameState,
    phase: Phase,
    next_ticket: u64,
    stats: DecisionStats,
    fallback: Box<dyn FallbackPolicy>,
}

impl std::fmt::Debug for GameMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMachine")
            .field("phase", &self.phase)
            .field("scores", self.state.scores())
            .field("hands_dealt", &self.state.hands_dealt())
            .finish_non_exhaustive()
    }
}

impl GameMachine {
    /// Create a machine waiting for the first deal.
    pub fn new(config: TrucoConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            state: GameState::new(config.seed, config.first_leader),
            config,
            phase: Phase::Dealing,
            next_ticket: 0,
            stats: DecisionStats::default(),
            fallback: Box::new(WeightedFallback::default()),
        })
    }

    /// Replace the policy used when the provider fails.
    #[must_use]
    pub fn with_fallback(mut self, policy: impl FallbackPolicy + 'static) -> Self {
        self.fallback = Box::new(policy);
        self
    }

    #[must_use]
    pub fn config(&self) -> &TrucoConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn stats(&self) -> &DecisionStats {
        &self.stats
    }

    #[must_use]
    pub fn hand(&self) -> Option<&HandState> {
        self.state.hand()
    }

    /// Side allowed to act now, if any.
    #[must_use]
    pub fn actor(&self) -> Option<Side> {
        self.phase.actor()
    }

    /// Discard the match and start over with the same configuration.
    ///
    /// The RNG stream carries on, so the new match deals different hands.
    /// Any in-flight decision becomes stale.
    pub fn new_match(&mut self) {
        let rng = self.state.rng().clone();
        self.state = GameState::with_rng(rng, self.config.first_leader);
        self.phase = Phase::Dealing;
        info!("new match");
    }

    // =========================================================================
    // Dealing
    // =========================================================================

    /// Shuffle a fresh deck and deal the next hand.
    pub fn deal(&mut self) -> Result<(), EngineError> {
        self.expect_phase(PhaseKind::Dealing)?;
        let deck = create_deck(self.state.rng_mut());
        let deal = Deal::from_deck(&deck)?;
        self.start_hand(deal);
        Ok(())
    }

    /// Deal fixed cards. Does not consume randomness.
    pub fn deal_from(&mut self, deal: Deal) -> Result<(), EngineError> {
        self.expect_phase(PhaseKind::Dealing)?;
        deal.validate()?;
        self.start_hand(deal);
        Ok(())
    }

    fn start_hand(&mut self, deal: Deal) {
        let hand = self.state.start_hand(deal);
        info!(
            hand = hand.number(),
            vira = %hand.vira(),
            leader = %hand.turn(),
            "hand dealt"
        );
        self.enter_turn();
    }

    // =========================================================================
    // Player actions
    // =========================================================================

    /// Play the card at `index` of the player's hand.
    pub fn play(&mut self, index: usize, face_down: bool) -> Result<(), EngineError> {
        self.expect_actor(Side::Player)?;
        let cards = self.current_hand()?.hand(Side::Player);
        let card = *cards.get(index).ok_or(EngineError::CardIndexOutOfRange {
            index,
            hand_size: cards.len(),
        })?;
        self.apply(Side::Player, Action::Play { card, face_down })
    }

    pub fn truco(&mut self) -> Result<(), EngineError> {
        self.apply(Side::Player, Action::Truco)
    }

    pub fn accept(&mut self) -> Result<(), EngineError> {
        self.apply(Side::Player, Action::Accept)
    }

    pub fn raise(&mut self) -> Result<(), EngineError> {
        self.apply(Side::Player, Action::Raise)
    }

    /// Run from the opponent's proposal. Also used for "fold".
    pub fn run(&mut self) -> Result<(), EngineError> {
        self.apply(Side::Player, Action::Run)
    }

    /// Apply any player action, e.g. one taken from `legal_actions`.
    pub fn submit(&mut self, action: Action) -> Result<(), EngineError> {
        self.apply(Side::Player, action)
    }

    /// Leave `RoundResult`: next trick, or back to `Dealing` after a hand.
    pub fn advance(&mut self) -> Result<(), EngineError> {
        let Phase::RoundResult(report) = &self.phase else {
            return Err(self.mismatch(PhaseKind::RoundResult));
        };
        if report.hand.is_some() {
            self.phase = Phase::Dealing;
        } else {
            self.enter_turn();
        }
        Ok(())
    }

    /// Everything `side` may do right now. Empty when it is not `side`'s move.
    #[must_use]
    pub fn legal_actions(&self, side: Side) -> Vec<Action> {
        if self.phase.actor() != Some(side) {
            return Vec::new();
        }
        let Some(hand) = self.state.hand() else {
            return Vec::new();
        };
        let score = self.state.score(side);
        let threshold = self.config.hand_of_eleven;
        let betting = hand.betting();

        if self.phase.is_responding() {
            let mut actions = vec![Action::Accept, Action::Run];
            if betting.check_raise(side, score, threshold).is_ok() {
                actions.push(Action::Raise);
            }
            actions
        } else {
            let mut actions: Vec<Action> = hand
                .hand(side)
                .iter()
                .flat_map(|&card| [false, true].map(|face_down| Action::Play { card, face_down }))
                .collect();
            if betting.check_propose(side, score, threshold).is_ok() {
                actions.push(Action::Truco);
            }
            actions
        }
    }

    /// `side`'s view of the game. `None` before the first deal.
    #[must_use]
    pub fn view_for(&self, side: Side) -> Option<GameView> {
        GameView::build(&self.state, &self.phase, side, self.legal_actions(side))
    }

    // =========================================================================
    // Decision boundary
    // =========================================================================

    /// Hand out the opponent's queued decision.
    ///
    /// `None` when the opponent is not due to act or its request is already
    /// in flight; at most one request is ever outstanding.
    pub fn dispatch_decision(&mut self) -> Option<DecisionRequest> {
        let context = match &self.phase {
            Phase::AiThinking(_) => DecisionContext::Turn,
            Phase::TrucoProposalPlayer(_) => {
                DecisionContext::Respond(self.state.hand()?.betting().pending()?)
            }
            _ => return None,
        };

        let ticket = {
            let pending = self.phase.pending_mut()?;
            if pending.status == RequestStatus::InFlight {
                debug!(ticket = pending.ticket.0, "decision already in flight");
                return None;
            }
            pending.status = RequestStatus::InFlight;
            pending.ticket
        };

        self.stats.requests += 1;
        let view = self.view_for(Side::Opponent)?;
        debug!(ticket = ticket.0, ?context, "decision requested");
        Some(DecisionRequest {
            ticket,
            context,
            view,
        })
    }

    /// Give up on the in-flight request and queue a fresh one.
    ///
    /// The abandoned ticket becomes stale. Returns false when nothing was in
    /// flight.
    pub fn cancel_decision(&mut self) -> bool {
        let in_flight = self
            .phase
            .pending()
            .is_some_and(|p| p.status == RequestStatus::InFlight);
        if !in_flight {
            return false;
        }
        let fresh = self.queue_decision();
        if let Some(pending) = self.phase.pending_mut() {
            debug!(old = pending.ticket.0, new = fresh.ticket.0, "decision cancelled");
            *pending = fresh;
        }
        true
    }

    /// Apply the provider's outcome for `ticket`.
    ///
    /// A ticket other than the one in flight is dropped with
    /// `StaleDecision`. A failed outcome is replaced by the fallback policy.
    /// A response is coerced to a legal action against the current state.
    pub fn resolve_decision(
        &mut self,
        ticket: DecisionTicket,
        outcome: Result<DecisionResponse, DecisionError>,
    ) -> Result<AppliedDecision, EngineError> {
        let expected = self
            .phase
            .pending()
            .filter(|p| p.status == RequestStatus::InFlight)
            .map(|p| p.ticket);
        if expected != Some(ticket) {
            self.stats.stale += 1;
            warn!(ticket = ticket.0, ?expected, "dropping stale decision");
            return Err(EngineError::StaleDecision {
                expected,
                got: ticket,
            });
        }

        let (action, coercion, fell_back, flavor) = match outcome {
            Ok(response) => {
                let validated = coerce(&response, &self.legality(Side::Opponent)?)?;
                (validated.action, validated.coercion, false, response.flavor)
            }
            Err(err) => {
                warn!(ticket = ticket.0, error = %err, "decision failed, using fallback");
                self.stats.fallbacks += 1;
                let legal = self.legal_actions(Side::Opponent);
                let action = self
                    .fallback
                    .choose(&legal, self.state.rng_mut())
                    .or_else(|| legal.first().copied())
                    .ok_or(EngineError::NoLegalAction(Side::Opponent))?;
                (action, None, true, None)
            }
        };

        if let Some(coercion) = &coercion {
            warn!(ticket = ticket.0, ?coercion, "coerced opponent decision");
            self.stats.record_coercion(coercion);
        }

        self.apply(Side::Opponent, action)?;
        self.stats.applied += 1;
        Ok(AppliedDecision {
            ticket,
            action,
            coercion,
            fell_back,
            flavor,
        })
    }

    fn legality(&self, side: Side) -> Result<Legality<'_>, EngineError> {
        let hand = self.current_hand()?;
        let score = self.state.score(side);
        let threshold = self.config.hand_of_eleven;
        Ok(Legality {
            side,
            responding: self.phase.is_responding(),
            hand: hand.hand(side),
            propose: hand.betting().check_propose(side, score, threshold),
            raise: hand.betting().check_raise(side, score, threshold),
        })
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn apply(&mut self, side: Side, action: Action) -> Result<(), EngineError> {
        self.expect_actor(side)?;
        let responding = self.phase.is_responding();
        let score = self.state.score(side);
        let threshold = self.config.hand_of_eleven;

        match action {
            Action::Play { card, face_down } => {
                if responding {
                    return Err(EngineError::ProposalOutstanding);
                }
                let complete = {
                    let hand = self.current_hand_mut()?;
                    hand.play(side, card, face_down)?;
                    let complete = hand.table().is_complete();
                    if !complete {
                        hand.set_turn(side.other());
                    }
                    complete
                };
                self.state.record(side, action);
                debug!(side = %side, card = %card, face_down, "card played");
                if complete {
                    self.finish_trick();
                } else {
                    self.enter_turn();
                }
            }
            Action::Truco => {
                if responding {
                    return Err(EngineError::ProposalOutstanding);
                }
                let rung = self
                    .current_hand_mut()?
                    .betting_mut()
                    .propose(side, score, threshold)?;
                self.state.record(side, action);
                info!(side = %side, rung = rung.points(), "truco");
                self.enter_proposal(side);
            }
            Action::Raise => {
                let rung = self
                    .current_hand_mut()?
                    .betting_mut()
                    .raise(side, score, threshold)?;
                self.state.record(side, action);
                info!(side = %side, rung = rung.points(), "raise");
                self.enter_proposal(side);
            }
            Action::Accept => {
                let stake = self.current_hand_mut()?.betting_mut().accept(side)?;
                self.state.record(side, action);
                info!(side = %side, stake = stake.points(), "accepted");
                self.enter_turn();
            }
            Action::Run => {
                let payout = self.config.run_payout;
                let settlement = self.current_hand_mut()?.betting_mut().run(side, payout)?;
                self.state.record(side, action);
                info!(side = %side, points = settlement.points, "ran");
                self.finish_hand(
                    Some(settlement.winner),
                    settlement.points,
                    HandEnding::Ran { by: side },
                    None,
                );
            }
        }
        Ok(())
    }

    fn finish_trick(&mut self) {
        let tie_rules = (self.config.unresolved_tie, self.config.all_draw);
        let Some(hand) = self.state.hand_mut() else {
            return;
        };
        let trick = hand.close_trick();
        let tie = TieBreak {
            first_leader: hand.first_leader(),
            unresolved: tie_rules.0,
            all_draw: tie_rules.1,
        };
        let verdict = evaluate_hand(&hand.trick_outcomes(), &tie);
        let stake = hand.stake().points();
        info!(hand = hand.number(), outcome = ?trick.outcome, ?verdict, "trick resolved");

        match verdict {
            HandVerdict::Pending => {
                self.phase = Phase::RoundResult(RoundReport {
                    trick: Some(trick),
                    hand: None,
                });
            }
            HandVerdict::Won(winner) => {
                self.finish_hand(Some(winner), stake, HandEnding::Tricks, Some(trick));
            }
            HandVerdict::Push => self.finish_hand(None, 0, HandEnding::Tricks, Some(trick)),
        }
    }

    fn finish_hand(
        &mut self,
        winner: Option<Side>,
        points: u8,
        ending: HandEnding,
        trick: Option<CompletedTrick>,
    ) {
        let Some(hand) = self.state.hand() else {
            return;
        };
        let summary = hand.summarize(winner, points, ending);
        let next_leader = match (self.config.lead_rule, winner) {
            (LeadRule::LoserLeads, Some(w)) => w.other(),
            _ => hand.first_leader().other(),
        };

        let new_score = winner.map(|w| self.state.award(w, points));
        self.state.push_summary(summary.clone());
        self.state.set_next_leader(next_leader);
        info!(
            hand = summary.number,
            winner = ?winner,
            points,
            player = self.state.score(Side::Player),
            opponent = self.state.score(Side::Opponent),
            "hand finished"
        );

        match (winner, new_score) {
            (Some(winner), Some(score)) if score >= self.config.target_score => {
                info!(winner = %winner, "match over");
                self.phase = Phase::GameOver(MatchResult {
                    winner,
                    scores: self.state.scores().clone(),
                    final_hand: summary,
                });
            }
            _ => {
                self.phase = Phase::RoundResult(RoundReport {
                    trick,
                    hand: Some(summary),
                });
            }
        }
    }

    /// Enter the turn phase for whoever is due to play.
    fn enter_turn(&mut self) {
        let Some(turn) = self.state.hand().map(HandState::turn) else {
            self.phase = Phase::Dealing;
            return;
        };
        self.phase = match turn {
            Side::Player => Phase::PlayerTurn,
            Side::Opponent => Phase::AiThinking(self.queue_decision()),
        };
        debug!(phase = ?self.phase.kind(), "turn");
    }

    fn enter_proposal(&mut self, proposer: Side) {
        self.phase = match proposer {
            Side::Player => Phase::TrucoProposalPlayer(self.queue_decision()),
            Side::Opponent => Phase::TrucoProposalAi,
        };
    }

    fn queue_decision(&mut self) -> PendingDecision {
        self.next_ticket += 1;
        PendingDecision {
            ticket: DecisionTicket(self.next_ticket),
            status: RequestStatus::Queued,
        }
    }

    // =========================================================================
    // Guards
    // =========================================================================

    fn expect_phase(&self, expected: PhaseKind) -> Result<(), EngineError> {
        if self.phase.kind() == expected {
            Ok(())
        } else {
            Err(self.mismatch(expected))
        }
    }

    fn expect_actor(&self, side: Side) -> Result<(), EngineError> {
        match self.phase.actor() {
            Some(actor) if actor == side => Ok(()),
            Some(_) => Err(EngineError::OutOfTurn(side)),
            None if self.phase.is_over() => Err(EngineError::MatchOver),
            None => Err(self.mismatch(match side {
                Side::Player => PhaseKind::PlayerTurn,
                Side::Opponent => PhaseKind::AiThinking,
            })),
        }
    }

    fn mismatch(&self, expected: PhaseKind) -> EngineError {
        if self.phase.is_over() {
            return EngineError::MatchOver;
        }
        EngineError::PhaseMismatch {
            expected,
            actual: self.phase.kind(),
        }
    }

    fn current_hand(&self) -> Result<&HandState, EngineError> {
        self.state.hand().ok_or(EngineError::PhaseMismatch {
            expected: PhaseKind::PlayerTurn,
            actual: self.phase.kind(),
        })
    }

    fn current_hand_mut(&mut self) -> Result<&mut HandState, EngineError> {
        let actual = self.phase.kind();
        self.state.hand_mut().ok_or(EngineError::PhaseMismatch {
            expected: PhaseKind::PlayerTurn,
            actual,
        })
    }
}
