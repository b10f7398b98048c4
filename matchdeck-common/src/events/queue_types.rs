//! Queue and user action type definitions
//!
//! Supporting types for queue progression and swipe feedback.

use serde::{Deserialize, Serialize};

/// Brief confirmation flashed after a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SwipeFeedback {
    Saved,
    Skipped,
}

impl SwipeFeedback {
    pub fn for_direction(direction: crate::Direction) -> Self {
        match direction {
            crate::Direction::Right => SwipeFeedback::Saved,
            crate::Direction::Left => SwipeFeedback::Skipped,
        }
    }
}

impl std::fmt::Display for SwipeFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeFeedback::Saved => write!(f, "Saved"),
            SwipeFeedback::Skipped => write!(f, "Skipped"),
        }
    }
}

/// Why the queue was reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueResetTrigger {
    /// First candidate list supplied to the engine
    Initial,
    /// Host refreshed the list or switched matching mode
    SourceChanged,
}

impl std::fmt::Display for QueueResetTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueResetTrigger::Initial => write!(f, "Initial"),
            QueueResetTrigger::SourceChanged => write!(f, "SourceChanged"),
        }
    }
}
