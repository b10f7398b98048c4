//! External collaborators of the swipe engine
//!
//! The engine consumes two services it does not own:
//! - an [`InsightProvider`] that reads or generates a compatibility blurb
//! - a [`DecisionSink`] that records swipes upstream
//!
//! Both are object-safe async traits so hosts can plug in the HTTP adapter,
//! the in-memory adapter or a test double.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use matchdeck_common::{Candidate, CandidateId, Direction, Insight, QueueKind, ViewerProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::{HttpDecisionSink, HttpInsightProvider};
pub use memory::{MemoryDecisionSink, MemoryInsightProvider};

/// Location sent with every generation request
pub const DEFAULT_LOCATION: &str = "Campus";

/// Insight provider errors
#[derive(Debug, Error)]
pub enum InsightError {
    /// No cached insight for this candidate; generation should be attempted
    #[error("No insight for candidate {0}")]
    NotFound(CandidateId),

    #[error("Insight request failed: {0}")]
    Request(String),

    #[error("Insight parse error: {0}")]
    Parse(String),
}

/// Decision sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Swipe request failed: {0}")]
    Request(String),

    #[error("Swipe rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// One side of a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Seed data for on-demand insight generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightContext {
    /// Viewer first (when known), then the candidate
    pub participants: Vec<Participant>,
    pub shared_interests: Vec<String>,
    pub location: String,
    pub mood: String,
}

impl InsightContext {
    /// Build the generation context for `candidate`
    ///
    /// Mood follows the queue mode: `upbeat` for individual matching,
    /// `collaborative` for group matching.
    pub fn for_candidate(
        candidate: &Candidate,
        viewer: Option<&ViewerProfile>,
        kind: QueueKind,
    ) -> Self {
        let mut participants = Vec::with_capacity(2);
        if let Some(viewer) = viewer {
            participants.push(Participant {
                name: viewer.display_name.clone(),
                bio: viewer.bio.clone(),
                interests: viewer.interests.clone(),
            });
        }
        participants.push(Participant {
            name: candidate.display_name.clone(),
            bio: None,
            interests: candidate.shared_interests.clone(),
        });

        let mood = match kind {
            QueueKind::Individual => "upbeat",
            QueueKind::Group => "collaborative",
        };

        Self {
            participants,
            shared_interests: candidate.shared_interests.clone(),
            location: DEFAULT_LOCATION.to_string(),
            mood: mood.to_string(),
        }
    }
}

/// Source of compatibility insights
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Cache read. `InsightError::NotFound` means "nothing yet, generate one".
    async fn lookup(&self, candidate_id: &CandidateId) -> Result<Insight, InsightError>;

    /// Generate a fresh insight from `context`
    async fn generate(
        &self,
        candidate_id: &CandidateId,
        context: &InsightContext,
    ) -> Result<Insight, InsightError>;
}

/// Upstream acknowledgement of a recorded swipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeReceipt {
    /// Both sides accepted each other
    #[serde(default, alias = "is_mutual_match")]
    pub mutual_match: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Upstream record of swipe outcomes
///
/// Calls are fire-and-forget from the engine's point of view: a failure is
/// logged and never rolls back local state.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn record(
        &self,
        candidate_id: &CandidateId,
        direction: Direction,
    ) -> Result<SwipeReceipt, SinkError>;

    /// Compensate a previously recorded swipe after an undo
    ///
    /// Only called when the engine is configured with `retract_on_undo`.
    async fn retract(&self, _candidate_id: &CandidateId) -> Result<(), SinkError> {
        Ok(())
    }
}
