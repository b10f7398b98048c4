//! Queue controller
//!
//! [`SwipeEngine`] owns the cursor into the candidate queue and is the only
//! caller of the gesture tracker, the decision history and the insight
//! orchestrator. All state changes happen on the task that owns the engine;
//! background work (insight fetches, timers, sink calls) reports back
//! through [`InternalEvent`]s or the event bus.
//!
//! Hosts either call the `&mut self` methods directly and pump
//! [`SwipeEngine::process_next_internal`], or hand the engine to
//! [`SwipeEngine::spawn`] and talk to it through an `EngineHandle`.

use super::events::InternalEvent;
use super::gesture::{GestureTracker, PointerId};
use super::history::DecisionHistory;
use super::insight::{InsightOrchestrator, InsightView};
use super::timers::ScheduledTask;
use crate::config::EngineConfig;
use crate::provider::{DecisionSink, InsightProvider};
use matchdeck_common::events::{EventBus, GestureFrame, MatchEvent, QueueResetTrigger, SwipeFeedback};
use matchdeck_common::{
    time, Candidate, Decision, DecisionId, Direction, QueueKind, UndoPrompt, ViewerProfile,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Keyboard input relevant to swiping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM-style key name
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// The swipe-decision engine
pub struct SwipeEngine {
    config: EngineConfig,
    session_id: Uuid,
    span: Span,
    bus: EventBus,
    sink: Arc<dyn DecisionSink>,

    tracker: GestureTracker,
    history: DecisionHistory,
    insights: InsightOrchestrator,

    candidates: Vec<Candidate>,
    cursor: usize,
    kind: QueueKind,
    initialized: bool,

    undo_prompt: Option<UndoPrompt>,
    prompt_timer: ScheduledTask,

    leave_generation: u64,
    leave_timer: ScheduledTask,

    feedback: Option<SwipeFeedback>,
    feedback_version: u64,
    feedback_timer: ScheduledTask,

    internal_tx: mpsc::UnboundedSender<InternalEvent>,
    internal_rx: mpsc::UnboundedReceiver<InternalEvent>,
}

impl SwipeEngine {
    pub fn new(
        config: EngineConfig,
        provider: Arc<dyn InsightProvider>,
        sink: Arc<dyn DecisionSink>,
    ) -> Self {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4();
        let span = info_span!("swipe_engine", session_id = %session_id);

        let insights =
            InsightOrchestrator::new(provider, internal_tx.clone(), config.timing.trait_cycle());

        Self {
            session_id,
            span,
            bus: EventBus::new(config.event_capacity),
            sink,
            tracker: GestureTracker::new(config.gesture.clone()),
            history: DecisionHistory::new(),
            insights,
            candidates: Vec::new(),
            cursor: 0,
            kind: QueueKind::default(),
            initialized: false,
            undo_prompt: None,
            prompt_timer: ScheduledTask::idle(),
            leave_generation: 0,
            leave_timer: ScheduledTask::idle(),
            feedback: None,
            feedback_version: 0,
            feedback_timer: ScheduledTask::idle(),
            internal_tx,
            internal_rx,
            config,
        }
    }

    /// Seed insight generation with the viewer's own profile
    pub fn with_viewer(mut self, viewer: ViewerProfile) -> Self {
        self.insights.set_viewer(Some(viewer));
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.bus.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    // ========================================
    // Queue
    // ========================================

    /// Replace the candidate queue
    ///
    /// Clears history, the cursor, gesture state, any undo prompt and the
    /// insight state, then starts enrichment for the first candidate.
    pub fn reset(&mut self, candidates: Vec<Candidate>, kind: QueueKind) {
        let trigger = if self.initialized {
            QueueResetTrigger::SourceChanged
        } else {
            QueueResetTrigger::Initial
        };
        self.initialized = true;

        self.span.in_scope(|| {
            info!(total = candidates.len(), kind = %kind, trigger = %trigger, "Queue reset");
        });

        self.candidates = candidates;
        self.cursor = 0;
        self.kind = kind;
        self.history.clear();
        self.clear_prompt();
        self.clear_feedback();
        self.insights.set_kind(kind);
        self.insights.cancel();

        self.bus.emit_lossy(MatchEvent::QueueReset {
            kind,
            total: self.candidates.len(),
            trigger,
            timestamp: time::now(),
        });
        self.on_cursor_moved();
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.candidates.get(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// `(current number, total)`, 1-based and capped at the total
    pub fn progress(&self) -> (usize, usize) {
        let total = self.candidates.len();
        ((self.cursor + 1).min(total), total)
    }

    /// Up to `count` candidates queued after the current one
    pub fn preview(&self, count: usize) -> &[Candidate] {
        let start = (self.cursor + 1).min(self.candidates.len());
        let end = (start + count).min(self.candidates.len());
        &self.candidates[start..end]
    }

    pub fn history(&self) -> &DecisionHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_prompt(&self) -> Option<&UndoPrompt> {
        self.undo_prompt.as_ref()
    }

    pub fn feedback(&self) -> Option<SwipeFeedback> {
        self.feedback
    }

    pub fn gesture_frame(&self) -> GestureFrame {
        self.tracker.frame()
    }

    pub fn insight_view(&self) -> InsightView {
        self.insights.view()
    }

    // ========================================
    // Gestures
    // ========================================

    pub fn begin_drag(&mut self, pointer_id: PointerId, x: f64, y: f64, now: Instant) -> bool {
        if self.current().is_none() {
            return false;
        }
        let started = self.tracker.begin_drag(pointer_id, x, y, now);
        if started {
            self.emit_frame();
        }
        started
    }

    pub fn update_drag(&mut self, pointer_id: PointerId, x: f64, y: f64, now: Instant) -> bool {
        let moved = self.tracker.update_drag(pointer_id, x, y, now);
        if moved {
            self.emit_frame();
        }
        moved
    }

    /// Release the pointer; commits when the drag crossed the threshold
    pub fn end_drag(&mut self, pointer_id: PointerId) -> Option<Decision> {
        let was_dragging = self.tracker.is_dragging();
        match self.tracker.end_drag(pointer_id) {
            Some(direction) => self.commit(direction),
            None => {
                if was_dragging && !self.tracker.is_dragging() {
                    self.emit_frame();
                }
                None
            }
        }
    }

    pub fn cancel_drag(&mut self) -> bool {
        let cancelled = self.tracker.cancel_drag();
        if cancelled {
            self.emit_frame();
        }
        cancelled
    }

    /// Button/keyboard swipe: animate out, commit after the leave delay
    pub fn trigger_swipe(&mut self, direction: Direction) -> bool {
        if self.current().is_none() || !self.tracker.trigger_programmatic(direction) {
            return false;
        }

        self.leave_generation += 1;
        self.leave_timer = ScheduledTask::once(
            self.internal_tx.clone(),
            self.config.timing.leave_delay(),
            InternalEvent::LeaveElapsed {
                generation: self.leave_generation,
            },
        );
        debug!(direction = %direction, "Programmatic swipe started");
        self.emit_frame();
        true
    }

    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::ArrowLeft => self.trigger_swipe(Direction::Left),
            Key::ArrowRight => self.trigger_swipe(Direction::Right),
            Key::Other => false,
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        if self.tracker.is_disabled() == disabled {
            return;
        }
        self.tracker.set_disabled(disabled);
        self.emit_frame();
    }

    // ========================================
    // Decisions
    // ========================================

    /// Commit a decision on the current candidate
    ///
    /// History is updated before the sink is called; a sink failure never
    /// rolls anything back.
    pub fn commit(&mut self, direction: Direction) -> Option<Decision> {
        let Some(candidate) = self.current() else {
            debug!(direction = %direction, "Commit ignored: queue exhausted");
            return None;
        };

        let decision = Decision::new(candidate, direction, time::now());
        self.span.in_scope(|| {
            info!(
                decision_id = %decision.id(),
                candidate_id = %decision.candidate_id(),
                direction = %direction,
                "Decision committed"
            );
        });

        self.history.push(decision.clone());
        self.bus.emit_lossy(MatchEvent::DecisionCommitted {
            decision: decision.clone(),
            replayed: false,
        });
        self.dispatch_to_sink(&decision);

        self.cursor += 1;
        match direction {
            Direction::Left => self.arm_prompt(&decision),
            Direction::Right => self.clear_prompt(),
        }
        self.show_feedback(direction);
        self.on_cursor_moved();

        Some(decision)
    }

    /// Roll back the most recent decision
    ///
    /// With `expected`, the call only proceeds while the undo prompt for that
    /// decision is still live and the decision is still the latest one.
    pub fn undo(&mut self, expected: Option<&DecisionId>) -> Option<Decision> {
        if let Some(expected) = expected {
            let prompt_live = self
                .undo_prompt
                .as_ref()
                .is_some_and(|p| &p.decision_id == expected);
            let is_last = self.history.last().is_some_and(|d| d.id() == expected);
            if !prompt_live || !is_last {
                debug!(decision_id = %expected, prompt_live, is_last, "Undo ignored: stale target");
                return None;
            }
        }

        let Some(decision) = self.history.undo() else {
            debug!("Undo ignored: history empty");
            return None;
        };

        self.cursor = self.cursor.saturating_sub(1);
        self.span.in_scope(|| {
            info!(
                decision_id = %decision.id(),
                candidate_id = %decision.candidate_id(),
                "Decision undone"
            );
        });

        self.clear_prompt();
        self.clear_feedback();
        if self.config.retract_on_undo {
            self.retract_from_sink(&decision);
        }

        self.bus.emit_lossy(MatchEvent::DecisionUndone {
            decision: decision.clone(),
            timestamp: time::now(),
        });
        self.on_cursor_moved();

        Some(decision)
    }

    /// Replay the most recently undone decision with its original id
    ///
    /// No undo prompt is armed for a replayed reject. The sink is only
    /// called again when `record_on_redo` is set.
    pub fn redo(&mut self) -> Option<Decision> {
        let Some(decision) = self.history.redo() else {
            debug!("Redo ignored: nothing to redo");
            return None;
        };

        self.cursor = (self.cursor + 1).min(self.candidates.len());
        self.span.in_scope(|| {
            info!(
                decision_id = %decision.id(),
                candidate_id = %decision.candidate_id(),
                direction = %decision.direction(),
                "Decision redone"
            );
        });

        self.bus.emit_lossy(MatchEvent::DecisionCommitted {
            decision: decision.clone(),
            replayed: true,
        });
        if self.config.record_on_redo {
            self.dispatch_to_sink(&decision);
        }

        self.clear_prompt();
        self.show_feedback(decision.direction());
        self.on_cursor_moved();

        Some(decision)
    }

    // ========================================
    // Internal completions
    // ========================================

    /// Apply one background completion
    pub fn handle_internal(&mut self, event: InternalEvent) {
        debug!(kind = event.kind(), "Internal event");
        match event {
            InternalEvent::InsightResolved {
                generation,
                candidate_id,
                outcome,
            } => {
                if self.insights.apply(generation, &candidate_id, outcome) {
                    self.emit_insight();
                }
            }
            InternalEvent::TraitTick { generation } => {
                if self.insights.tick(generation).is_some() {
                    self.emit_traits();
                }
            }
            InternalEvent::LeaveElapsed { generation } => {
                if generation != self.leave_generation {
                    return;
                }
                if let Some(direction) = self.tracker.finish_leave() {
                    self.commit(direction);
                }
            }
            InternalEvent::PromptExpired { decision_id } => {
                let matches = self
                    .undo_prompt
                    .as_ref()
                    .is_some_and(|p| p.decision_id == decision_id);
                if matches {
                    debug!(decision_id = %decision_id, "Undo prompt expired");
                    self.clear_prompt();
                }
            }
            InternalEvent::FeedbackElapsed { version } => {
                if version == self.feedback_version {
                    self.clear_feedback();
                }
            }
        }
    }

    /// Wait for the next background completion and apply it
    pub async fn process_next_internal(&mut self) -> bool {
        match self.internal_rx.recv().await {
            Some(event) => {
                self.handle_internal(event);
                true
            }
            None => false,
        }
    }

    /// Apply every completion that is already queued
    pub fn process_pending_internal(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.internal_rx.try_recv() {
            self.handle_internal(event);
            handled += 1;
        }
        handled
    }

    // ========================================
    // Helpers
    // ========================================

    /// Common tail of every cursor change
    fn on_cursor_moved(&mut self) {
        self.leave_generation += 1;
        self.leave_timer.cancel();
        self.tracker.reset();

        let current = self.current().cloned();
        self.bus.emit_lossy(MatchEvent::Advanced {
            current: current.clone(),
            position: self.cursor,
            total: self.candidates.len(),
            timestamp: time::now(),
        });
        if current.is_none() {
            debug!(total = self.candidates.len(), "Queue exhausted");
            self.bus.emit_lossy(MatchEvent::QueueExhausted {
                total: self.candidates.len(),
                timestamp: time::now(),
            });
        }
        self.emit_frame();

        if self.insights.request(current.as_ref()) {
            self.emit_insight();
        }
    }

    fn arm_prompt(&mut self, decision: &Decision) {
        let lifetime_ms = self.config.timing.undo_prompt_ms;
        let prompt = UndoPrompt {
            decision_id: decision.id().clone(),
            expires_at: time::after_millis(time::now(), lifetime_ms),
            candidate_name: decision.candidate_name().to_string(),
        };

        self.prompt_timer = ScheduledTask::once(
            self.internal_tx.clone(),
            self.config.timing.undo_prompt(),
            InternalEvent::PromptExpired {
                decision_id: prompt.decision_id.clone(),
            },
        );
        self.undo_prompt = Some(prompt.clone());
        self.bus
            .emit_lossy(MatchEvent::UndoPromptChanged { prompt: Some(prompt) });
    }

    fn clear_prompt(&mut self) {
        self.prompt_timer.cancel();
        if self.undo_prompt.take().is_some() {
            self.bus.emit_lossy(MatchEvent::UndoPromptChanged { prompt: None });
        }
    }

    fn show_feedback(&mut self, direction: Direction) {
        let feedback = SwipeFeedback::for_direction(direction);
        self.feedback_version += 1;
        self.feedback = Some(feedback);
        self.feedback_timer = ScheduledTask::once(
            self.internal_tx.clone(),
            self.config.timing.feedback(),
            InternalEvent::FeedbackElapsed {
                version: self.feedback_version,
            },
        );
        self.bus.emit_lossy(MatchEvent::SwipeFeedbackChanged {
            feedback: Some(feedback),
        });
    }

    fn clear_feedback(&mut self) {
        self.feedback_version += 1;
        self.feedback_timer.cancel();
        if self.feedback.take().is_some() {
            self.bus
                .emit_lossy(MatchEvent::SwipeFeedbackChanged { feedback: None });
        }
    }

    fn emit_frame(&self) {
        self.bus.emit_lossy(MatchEvent::GestureFrame {
            frame: self.tracker.frame(),
        });
    }

    fn emit_insight(&self) {
        let view = self.insights.view();
        let loading = view.loading;
        self.bus.emit_lossy(MatchEvent::InsightChanged {
            candidate_id: view.candidate_id.clone(),
            insight: view.insight,
            display_text: view.display_text,
            loading,
        });
        if loading {
            self.emit_traits();
        }
    }

    fn emit_traits(&self) {
        let view = self.insights.view();
        if let Some(candidate_id) = view.candidate_id {
            self.bus.emit_lossy(MatchEvent::TraitPreviewChanged {
                candidate_id,
                traits: view.traits,
                active_index: view.trait_index,
            });
        }
    }

    /// Fire-and-forget upstream record
    fn dispatch_to_sink(&self, decision: &Decision) {
        let sink = Arc::clone(&self.sink);
        let bus = self.bus.clone();
        let candidate_id = decision.candidate_id().clone();
        let candidate_name = decision.candidate_name().to_string();
        let direction = decision.direction();

        tokio::spawn(
            async move {
                match sink.record(&candidate_id, direction).await {
                    Ok(receipt) if receipt.mutual_match => {
                        info!(candidate_id = %candidate_id, "Mutual match");
                        bus.emit_lossy(MatchEvent::MutualMatch {
                            candidate_id,
                            candidate_name,
                            message: receipt
                                .message
                                .unwrap_or_else(|| "It's a match!".to_string()),
                            timestamp: time::now(),
                        });
                    }
                    Ok(_) => {
                        debug!(candidate_id = %candidate_id, direction = %direction, "Swipe recorded");
                    }
                    Err(e) => {
                        warn!(
                            candidate_id = %candidate_id,
                            direction = %direction,
                            error = %e,
                            "Failed to record swipe"
                        );
                    }
                }
            }
            .instrument(self.span.clone()),
        );
    }

    fn retract_from_sink(&self, decision: &Decision) {
        let sink = Arc::clone(&self.sink);
        let candidate_id = decision.candidate_id().clone();

        tokio::spawn(
            async move {
                if let Err(e) = sink.retract(&candidate_id).await {
                    warn!(candidate_id = %candidate_id, error = %e, "Failed to retract swipe");
                }
            }
            .instrument(self.span.clone()),
        );
    }

    pub(super) fn span(&self) -> &Span {
        &self.span
    }

    pub(super) fn internal_rx_mut(&mut self) -> &mut mpsc::UnboundedReceiver<InternalEvent> {
        &mut self.internal_rx
    }
}
