//! Test helper modules for matchdeck-engine integration tests
//!
//! Provides reusable test infrastructure components:
//! - ScriptedProvider: insight provider with per-candidate replies and gates
//! - RecordingSink: decision sink that records (and optionally fails)
//! - Builders for candidates and engines, event draining, task settling

#![allow(dead_code)]

pub mod collaborators;

pub use collaborators::{InsightReply, RecordingSink, ScriptedProvider};

use matchdeck_common::events::MatchEvent;
use matchdeck_common::Candidate;
use matchdeck_engine::{EngineConfig, SwipeEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Candidates named after their ids ("a" -> "A")
pub fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter()
        .map(|id| Candidate::new(*id, id.to_uppercase()))
        .collect()
}

pub struct TestEngine {
    pub engine: SwipeEngine,
    pub provider: Arc<ScriptedProvider>,
    pub sink: Arc<RecordingSink>,
    pub events: broadcast::Receiver<MatchEvent>,
}

pub fn engine_with(config: EngineConfig, provider: ScriptedProvider, sink: RecordingSink) -> TestEngine {
    let provider = Arc::new(provider);
    let sink = Arc::new(sink);
    let engine = SwipeEngine::new(config, provider.clone(), sink.clone());
    let events = engine.subscribe();
    TestEngine {
        engine,
        provider,
        sink,
        events,
    }
}

pub fn default_engine() -> TestEngine {
    engine_with(
        EngineConfig::default(),
        ScriptedProvider::new(),
        RecordingSink::new(),
    )
}

/// Let spawned tasks (fetches, timers, sink calls) run to their next await
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Advance paused time, let tasks run, then apply internal completions
pub async fn advance_and_process(engine: &mut SwipeEngine, millis: u64) {
    tokio::time::advance(Duration::from_millis(millis)).await;
    settle().await;
    engine.process_pending_internal();
}

/// Apply everything that is ready without moving the clock
pub async fn process(engine: &mut SwipeEngine) {
    settle().await;
    engine.process_pending_internal();
}

/// All events currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<MatchEvent>) -> Vec<MatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn kinds(events: &[MatchEvent]) -> Vec<&'static str> {
    events.iter().map(MatchEvent::kind).collect()
}
