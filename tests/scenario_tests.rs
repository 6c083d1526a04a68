//! Full-hand scenarios through the state machine.
//!
//! Each test deals fixed cards and plays them through `GameMachine`,
//! answering for the opponent via the decision boundary.

mod common;

use common::{answer, card, deal, machine, machine_with};
use truco_engine::decision::RaiseBlock;
use truco_engine::{
    Action, ActionKind, Coercion, DecisionError, DecisionResponse, EngineError, HandEnding,
    LeadRule, Phase, PhaseKind, RoundWinner, Side, Stake, TieRule, TrickOutcome, TrucoConfig,
};

/// The 2-0 sweep ends the hand after the second trick.
#[test]
fn test_sweep_ends_hand_without_third_trick() {
    let mut m = machine();
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();

    // Trick 1: 4♦ (power 0) vs Q♦ (power 4)
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::play(0));
    m.advance().unwrap();

    // The trick winner leads trick 2
    assert_eq!(m.phase().kind(), PhaseKind::AiThinking);
    answer(&mut m, DecisionResponse::play(0));
    assert_eq!(m.phase().kind(), PhaseKind::PlayerTurn);
    m.play(1, false).unwrap();

    let Phase::RoundResult(report) = m.phase() else {
        panic!("expected RoundResult, got {:?}", m.phase().kind());
    };
    let summary = report.hand.as_ref().expect("hand should be over");
    assert_eq!(summary.winner, Some(Side::Opponent));
    assert_eq!(summary.points, 1);
    assert_eq!(summary.tricks.len(), 2);
    assert_eq!(
        summary.round_winners,
        [RoundWinner::Opponent, RoundWinner::Opponent, RoundWinner::Undecided]
    );
    assert_eq!(m.state().score(Side::Opponent), 1);
    assert_eq!(m.hand().unwrap().hand(Side::Player), &[card("7♥")]);

    m.advance().unwrap();
    assert_eq!(m.phase().kind(), PhaseKind::Dealing);
    assert_eq!(m.state().hand_history().len(), 1);
}

/// A face-down card loses to any face-up card, whatever its power.
#[test]
fn test_face_down_loses_to_face_up() {
    let mut m = machine();
    m.deal_from(deal(["3♣", "5♥", "6♥"], ["4♦", "7♠", "J♠"], "Q♥"))
        .unwrap();

    m.play(0, true).unwrap();

    // The opponent sees that a card is down, not which one
    let view = m.view_for(Side::Opponent).unwrap();
    assert_eq!(view.table.len(), 1);
    assert!(view.table[0].face_down);
    assert_eq!(view.table[0].card, None);
    assert_eq!(view.history[0].card, None);

    answer(&mut m, DecisionResponse::play(0));
    let Phase::RoundResult(report) = m.phase() else {
        panic!("expected RoundResult");
    };
    assert_eq!(
        report.trick.as_ref().unwrap().outcome,
        TrickOutcome::Won(Side::Opponent)
    );

    // The player still sees its own card
    let own = m.view_for(Side::Player).unwrap();
    assert_eq!(own.tricks[0].cards[0].card, Some(card("3♣")));
}

#[test]
fn test_both_face_down_is_a_draw() {
    let mut m = machine();
    m.deal_from(deal(["3♣", "5♥", "6♥"], ["4♦", "7♠", "J♠"], "Q♥"))
        .unwrap();

    m.play(0, true).unwrap();
    answer(&mut m, DecisionResponse::play(2).face_down());

    let Phase::RoundResult(report) = m.phase() else {
        panic!("expected RoundResult");
    };
    assert_eq!(report.trick.as_ref().unwrap().outcome, TrickOutcome::Draw);

    // After a draw the same side leads again
    m.advance().unwrap();
    assert_eq!(m.phase().kind(), PhaseKind::PlayerTurn);
}

/// Stake moves up the ladder; the last raiser must wait.
#[test]
fn test_stake_ladder() {
    let mut m = machine();
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();

    m.truco().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Accept));
    assert_eq!(m.hand().unwrap().stake(), Stake::Three);
    assert_eq!(m.truco(), Err(EngineError::ConsecutiveRaise(Side::Player)));

    // Player plays; on its own turn the opponent asks for six
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Truco));
    assert_eq!(m.phase().kind(), PhaseKind::TrucoProposalAi);
    assert_eq!(
        m.legal_actions(Side::Player),
        vec![Action::Accept, Action::Run, Action::Raise]
    );
    assert!(matches!(m.play(0, false), Err(EngineError::ProposalOutstanding)));

    m.accept().unwrap();
    assert_eq!(m.hand().unwrap().stake(), Stake::Six);

    // Turn returns to the opponent, who may not ask again
    assert_eq!(m.phase().kind(), PhaseKind::AiThinking);
    let applied = answer(&mut m, DecisionResponse::new(ActionKind::Truco));
    assert_eq!(
        applied.coercion,
        Some(Coercion::RaiseBlocked(RaiseBlock::ConsecutiveRaise))
    );
    assert!(matches!(applied.action, Action::Play { face_down: false, .. }));
    assert_eq!(m.stats().coercions("raise_blocked_consecutive"), 1);
}

#[test]
fn test_raise_chain_to_twelve() {
    let mut m = machine();
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();

    m.truco().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Raise));
    assert_eq!(m.hand().unwrap().stake(), Stake::Three);
    m.raise().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Raise));
    assert_eq!(m.hand().unwrap().betting().pending().unwrap().rung, Stake::Twelve);

    // Nothing above twelve
    assert_eq!(m.raise(), Err(EngineError::StakeCeiling));
    m.accept().unwrap();
    assert_eq!(m.hand().unwrap().stake(), Stake::Twelve);
    assert_eq!(m.phase().kind(), PhaseKind::PlayerTurn);
    assert!(!m.legal_actions(Side::Player).contains(&Action::Truco));
}

#[test]
fn test_run_from_raise_pays_pre_raise_stake() {
    let mut m = machine();
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();

    m.truco().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Raise));
    m.run().unwrap();

    assert_eq!(m.state().score(Side::Opponent), 3);
    let summary = m.state().hand_history().back().cloned().unwrap();
    assert_eq!(summary.ending, HandEnding::Ran { by: Side::Player });
    assert_eq!(summary.winner, Some(Side::Opponent));
}

#[test]
fn test_hand_of_eleven_blocks_betting() {
    let config = TrucoConfig::default().with_hand_of_eleven(1).with_target_score(12);
    let mut m = machine_with(config);

    // Hand 1: the opponent runs, the player reaches the threshold
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();
    m.truco().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Run));
    assert_eq!(m.state().score(Side::Player), 1);
    m.advance().unwrap();

    // Hand 2: the opponent leads and asks for three
    m.deal_from(deal(["4♣", "7♦", "A♠"], ["Q♣", "3♥", "2♦"], "6♦"))
        .unwrap();
    assert_eq!(m.phase().kind(), PhaseKind::AiThinking);
    answer(&mut m, DecisionResponse::new(ActionKind::Truco));

    assert_eq!(m.legal_actions(Side::Player), vec![Action::Accept, Action::Run]);
    assert_eq!(m.raise(), Err(EngineError::HandOfEleven(Side::Player)));
    m.accept().unwrap();

    answer(&mut m, DecisionResponse::play(0));
    assert_eq!(m.truco(), Err(EngineError::HandOfEleven(Side::Player)));
    assert!(!m.legal_actions(Side::Player).contains(&Action::Truco));
}

#[test]
fn test_opponent_at_eleven_raise_is_coerced() {
    let config = TrucoConfig::default().with_hand_of_eleven(1);
    let mut m = machine_with(config);

    // Hand 1: the player runs from the opponent's truco
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Truco));
    m.run().unwrap();
    assert_eq!(m.state().score(Side::Opponent), 1);
    m.advance().unwrap();

    // Hand 2: the opponent leads, the player proposes
    m.deal_from(deal(["4♣", "7♦", "A♠"], ["Q♣", "3♥", "2♦"], "6♦"))
        .unwrap();
    answer(&mut m, DecisionResponse::play(0));
    m.truco().unwrap();

    let applied = answer(&mut m, DecisionResponse::new(ActionKind::Raise));
    assert_eq!(applied.action, Action::Accept);
    assert_eq!(
        applied.coercion,
        Some(Coercion::RaiseBlocked(RaiseBlock::HandOfEleven))
    );
    assert_eq!(m.hand().unwrap().stake(), Stake::Three);
}

#[test]
fn test_all_draw_hand_pushes() {
    let mut m = machine();
    m.deal_from(deal(["7♥", "A♣", "K♦"], ["7♠", "A♦", "K♠"], "4♦"))
        .unwrap();

    for _ in 0..2 {
        m.play(0, false).unwrap();
        answer(&mut m, DecisionResponse::play(0));
        assert!(matches!(m.phase(), Phase::RoundResult(r) if r.hand.is_none()));
        m.advance().unwrap();
    }
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::play(0));

    let summary = m.state().hand_history().back().cloned().unwrap();
    assert_eq!(summary.winner, None);
    assert_eq!(summary.points, 0);
    assert_eq!(summary.round_winners, [RoundWinner::Draw; 3]);
    assert_eq!(m.state().score(Side::Player), 0);
    assert_eq!(m.state().score(Side::Opponent), 0);
}

#[test]
fn test_all_draw_first_leader_wins_when_configured() {
    let config = TrucoConfig::default().with_all_draw(TieRule::FirstLeaderWins);
    let mut m = machine_with(config);
    m.deal_from(deal(["7♥", "A♣", "K♦"], ["7♠", "A♦", "K♠"], "4♦"))
        .unwrap();

    for _ in 0..2 {
        m.play(0, false).unwrap();
        answer(&mut m, DecisionResponse::play(0));
        m.advance().unwrap();
    }
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::play(0));

    assert_eq!(m.state().score(Side::Player), 1);
}

#[test]
fn test_lead_rules() {
    let play_lost_hand = |rule: LeadRule| {
        let mut m = machine_with(TrucoConfig::default().with_lead_rule(rule));
        m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
            .unwrap();
        m.play(0, false).unwrap();
        answer(&mut m, DecisionResponse::new(ActionKind::Truco));
        m.run().unwrap();
        m.state().next_leader()
    };

    assert_eq!(play_lost_hand(LeadRule::Alternate), Side::Opponent);
    assert_eq!(play_lost_hand(LeadRule::LoserLeads), Side::Player);
}

#[test]
fn test_reaching_target_ends_match() {
    let config = TrucoConfig::default()
        .with_target_score(3)
        .with_hand_of_eleven(2);
    let mut m = machine_with(config);
    m.deal_from(deal(["3♣", "3♦", "2♣"], ["4♠", "5♠", "6♠"], "7♥"))
        .unwrap();

    m.truco().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Accept));
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::play(0));
    m.advance().unwrap();
    m.play(0, false).unwrap();
    answer(&mut m, DecisionResponse::play(0));

    let Phase::GameOver(result) = m.phase() else {
        panic!("expected GameOver, got {:?}", m.phase().kind());
    };
    assert_eq!(result.winner, Side::Player);
    assert_eq!(result.scores[Side::Player], 3);
    assert_eq!(result.final_hand.points, 3);

    assert_eq!(m.play(0, false), Err(EngineError::MatchOver));
    assert_eq!(m.advance(), Err(EngineError::MatchOver));
    assert_eq!(m.deal(), Err(EngineError::MatchOver));
    assert!(m.dispatch_decision().is_none());

    m.new_match();
    assert_eq!(m.phase().kind(), PhaseKind::Dealing);
    assert_eq!(m.state().score(Side::Player), 0);
}

#[test]
fn test_history_records_every_action() {
    let mut m = machine();
    m.deal_from(deal(["4♦", "7♥", "A♣"], ["Q♦", "3♠", "2♥"], "5♦"))
        .unwrap();
    m.truco().unwrap();
    answer(&mut m, DecisionResponse::new(ActionKind::Accept));
    m.play(2, false).unwrap();

    let kinds: Vec<(Side, ActionKind)> = m
        .state()
        .history()
        .iter()
        .map(|r| (r.side, r.action.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (Side::Player, ActionKind::Truco),
            (Side::Opponent, ActionKind::Accept),
            (Side::Player, ActionKind::Play),
        ]
    );
    let sequences: Vec<u32> = m.state().history().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[test]
fn test_same_seed_same_match() {
    let run = || {
        let mut m = machine_with(TrucoConfig::default().with_seed(2024));
        let mut deals = Vec::new();
        for _ in 0..200 {
            match m.phase().kind() {
                PhaseKind::Dealing => {
                    m.deal().unwrap();
                    let hand = m.hand().unwrap();
                    deals.push((hand.vira(), hand.hand(Side::Opponent).to_vec()));
                }
                PhaseKind::RoundResult => m.advance().unwrap(),
                PhaseKind::PlayerTurn => m.play(0, false).unwrap(),
                PhaseKind::TrucoProposalAi => m.accept().unwrap(),
                PhaseKind::AiThinking | PhaseKind::TrucoProposalPlayer => {
                    let request = m.dispatch_decision().unwrap();
                    m.resolve_decision(request.ticket, Err(DecisionError::Timeout))
                        .unwrap();
                }
                PhaseKind::GameOver => break,
            }
        }
        (deals, m.state().scores().clone(), m.state().history().len())
    };
    assert_eq!(run(), run());
}
