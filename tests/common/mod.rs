//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use truco_engine::{
    Card, Deal, DecisionError, DecisionProvider, DecisionRequest, DecisionResponse, GameMachine,
    TrucoConfig,
};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once per process.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `"warn"`.
pub fn init_logging() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn card(s: &str) -> Card {
    s.parse().unwrap_or_else(|e| panic!("bad card {s}: {e}"))
}

pub fn deal(player: [&str; 3], opponent: [&str; 3], vira: &str) -> Deal {
    Deal {
        player: player.map(card),
        opponent: opponent.map(card),
        vira: card(vira),
    }
}

/// A machine with default rules, waiting for a deal.
pub fn machine() -> GameMachine {
    init_logging();
    GameMachine::new(TrucoConfig::default()).unwrap()
}

pub fn machine_with(config: TrucoConfig) -> GameMachine {
    init_logging();
    GameMachine::new(config).unwrap()
}

/// Dispatch the opponent's request and answer it synchronously.
pub fn answer(machine: &mut GameMachine, response: DecisionResponse) -> truco_engine::AppliedDecision {
    let request = machine
        .dispatch_decision()
        .expect("opponent should be due to act");
    machine
        .resolve_decision(request.ticket, Ok(response))
        .unwrap()
}

/// Provider that replays a fixed script, then reports itself unavailable.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<DecisionResponse, DecisionError>>>,
    pub seen: Mutex<Vec<DecisionRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Result<DecisionResponse, DecisionError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DecisionProvider for ScriptedProvider {
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        self.seen.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DecisionError::Unavailable("script exhausted".into())))
    }
}

/// Provider that never answers in time and counts concurrent calls.
#[derive(Default)]
pub struct SlowProvider {
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl DecisionProvider for SlowProvider {
    async fn decide(&self, _request: DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(DecisionResponse::play(0))
    }
}

/// Decrements on drop, so a timed-out call still counts as finished.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
