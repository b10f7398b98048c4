//! Event types for the matchdeck event system
//!
//! Provides the externally visible event definitions and the EventBus the
//! engine publishes them on.

// Sub-modules (supporting types)
mod gesture_types;
mod queue_types;

pub use gesture_types::{GestureFrame, GesturePhase, Transition};
pub use queue_types::{QueueResetTrigger, SwipeFeedback};

use crate::models::{Candidate, CandidateId, Decision, Insight, QueueKind, UndoPrompt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Matchdeck event types
///
/// Events are broadcast via EventBus and can be serialized for transport to
/// a UI process. They drive presentation only; no engine logic depends on
/// anyone listening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    /// Candidate queue replaced
    ///
    /// Triggers:
    /// - UI: Drop history controls, reset progress counter
    QueueReset {
        /// Matching mode of the new queue
        kind: QueueKind,
        /// Number of candidates supplied
        total: usize,
        /// Why the queue was reset
        trigger: QueueResetTrigger,
        /// When the queue was reset
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Cursor moved (commit, undo, redo or reset)
    ///
    /// Triggers:
    /// - UI: Show the new top card and the preview stack
    Advanced {
        /// Candidate now shown, None when the queue is exhausted
        current: Option<Candidate>,
        /// 0-based cursor position
        position: usize,
        /// Queue length
        total: usize,
        /// When the cursor moved
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Cursor passed the last candidate
    ///
    /// Triggers:
    /// - UI: Show the "all caught up" state
    QueueExhausted {
        /// Queue length
        total: usize,
        /// When the queue ran out
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Swipe committed
    ///
    /// `replayed` is true when the decision came back through redo; the
    /// decision id is then the original one.
    DecisionCommitted {
        decision: Decision,
        replayed: bool,
    },

    /// Most recent decision rolled back
    DecisionUndone {
        decision: Decision,
        /// When the undo happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Undo prompt armed or cleared
    UndoPromptChanged {
        /// Active prompt, None when cleared or expired
        prompt: Option<UndoPrompt>,
    },

    /// Card presentation changed
    GestureFrame {
        frame: GestureFrame,
    },

    /// Insight state for the current candidate changed
    InsightChanged {
        /// Candidate the insight belongs to, None when nothing is shown
        candidate_id: Option<CandidateId>,
        /// Fetched insight, if any
        insight: Option<Insight>,
        /// Text to display: fetched summary, else the candidate's hint
        display_text: Option<String>,
        /// True while a lookup/generation is outstanding
        loading: bool,
    },

    /// Trait preview cycle advanced
    TraitPreviewChanged {
        candidate_id: CandidateId,
        traits: Vec<String>,
        active_index: usize,
    },

    /// Swipe feedback flash shown or cleared
    SwipeFeedbackChanged {
        feedback: Option<SwipeFeedback>,
    },

    /// Decision sink reported a mutual match
    MutualMatch {
        candidate_id: CandidateId,
        candidate_name: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MatchEvent {
    /// Variant name, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            MatchEvent::QueueReset { .. } => "QueueReset",
            MatchEvent::Advanced { .. } => "Advanced",
            MatchEvent::QueueExhausted { .. } => "QueueExhausted",
            MatchEvent::DecisionCommitted { .. } => "DecisionCommitted",
            MatchEvent::DecisionUndone { .. } => "DecisionUndone",
            MatchEvent::UndoPromptChanged { .. } => "UndoPromptChanged",
            MatchEvent::GestureFrame { .. } => "GestureFrame",
            MatchEvent::InsightChanged { .. } => "InsightChanged",
            MatchEvent::TraitPreviewChanged { .. } => "TraitPreviewChanged",
            MatchEvent::SwipeFeedbackChanged { .. } => "SwipeFeedbackChanged",
            MatchEvent::MutualMatch { .. } => "MutualMatch",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// Gesture frames are emitted at pointer-move rate, so size the capacity
/// for bursts (default 256).
///
/// # Examples
///
/// ```
/// use matchdeck_common::events::{EventBus, MatchEvent};
///
/// let event_bus = EventBus::new(64);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(MatchEvent::UndoPromptChanged { prompt: None });
///
/// match rx.try_recv() {
///     Ok(MatchEvent::UndoPromptChanged { prompt }) => assert!(prompt.is_none()),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MatchEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MatchEvent,
    ) -> Result<usize, broadcast::error::SendError<MatchEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// The engine publishes everything this way: a headless session with no
    /// UI attached is valid.
    pub fn emit_lossy(&self, event: MatchEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
