//! Internal completions posted back to the engine loop
//!
//! Background tasks (insight fetches, timers) never touch engine state.
//! They post one of these and the engine applies it on its own task,
//! discarding anything whose token no longer matches.

use matchdeck_common::{CandidateId, DecisionId, Insight};

/// Result of one insight fetch
#[derive(Debug, Clone, PartialEq)]
pub enum InsightOutcome {
    Ready(Insight),
    /// Generation failed or the provider errored; insight stays absent
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    InsightResolved {
        generation: u64,
        candidate_id: CandidateId,
        outcome: InsightOutcome,
    },
    TraitTick {
        generation: u64,
    },
    LeaveElapsed {
        generation: u64,
    },
    PromptExpired {
        decision_id: DecisionId,
    },
    FeedbackElapsed {
        version: u64,
    },
}

impl InternalEvent {
    /// Variant name, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            InternalEvent::InsightResolved { .. } => "InsightResolved",
            InternalEvent::TraitTick { .. } => "TraitTick",
            InternalEvent::LeaveElapsed { .. } => "LeaveElapsed",
            InternalEvent::PromptExpired { .. } => "PromptExpired",
            InternalEvent::FeedbackElapsed { .. } => "FeedbackElapsed",
        }
    }
}
