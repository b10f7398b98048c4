//! Shared data model for the swipe engine
//!
//! Candidates are supplied by the host and never mutated by the engine.
//! Decisions are immutable records of committed swipes; once built they
//! only move between the history stacks.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque candidate identifier, unique within a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One swipeable profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub display_name: String,
    #[serde(default)]
    pub shared_interests: Vec<String>,
    /// Overall compatibility in [0, 1], None when unknown
    #[serde(default)]
    pub compatibility_score: Option<f64>,
    #[serde(default)]
    pub schedule_score: Option<f64>,
    #[serde(default)]
    pub personality_score: Option<f64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Precomputed blurb shown when no fetched insight is available
    #[serde(default)]
    pub insight_hint: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            shared_interests: Vec::new(),
            compatibility_score: None,
            schedule_score: None,
            personality_score: None,
            avatar_url: None,
            insight_hint: None,
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scores(
        mut self,
        compatibility: Option<f64>,
        schedule: Option<f64>,
        personality: Option<f64>,
    ) -> Self {
        self.compatibility_score = compatibility;
        self.schedule_score = schedule;
        self.personality_score = personality;
        self
    }

    pub fn with_insight_hint(mut self, hint: impl Into<String>) -> Self {
        self.insight_hint = Some(hint.into());
        self
    }

    /// Check that every known score lies in [0, 1]
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("compatibility_score", self.compatibility_score),
            ("schedule_score", self.schedule_score),
            ("personality_score", self.personality_score),
        ];
        for (name, score) in scores {
            if let Some(value) = score {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(Error::InvalidInput(format!(
                        "candidate {}: {} out of range: {}",
                        self.id, name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parse and validate an ordered candidate list from JSON
///
/// Ids must be unique within the list.
pub fn parse_candidates(json: &str) -> Result<Vec<Candidate>> {
    let candidates: Vec<Candidate> =
        serde_json::from_str(json).map_err(|e| Error::Parse(format!("candidate list: {}", e)))?;

    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in &candidates {
        candidate.validate()?;
        if !seen.insert(candidate.id.clone()) {
            return Err(Error::InvalidInput(format!(
                "duplicate candidate id: {}",
                candidate.id
            )));
        }
    }

    Ok(candidates)
}

/// Swipe direction: right accepts, left rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// +1.0 for right, -1.0 for left
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn is_accept(self) -> bool {
        self == Direction::Right
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// Decision identifier, `<candidateId>-<timestamp millis>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(String);

impl DecisionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DecisionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Record of a committed swipe
///
/// Fields are private: a decision is never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    id: DecisionId,
    direction: Direction,
    candidate_id: CandidateId,
    candidate_name: String,
    timestamp: DateTime<Utc>,
}

impl Decision {
    pub fn new(candidate: &Candidate, direction: Direction, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: DecisionId(format!("{}-{}", candidate.id, timestamp.timestamp_millis())),
            direction,
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.display_name.clone(),
            timestamp,
        }
    }

    pub fn id(&self) -> &DecisionId {
        &self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn candidate_id(&self) -> &CandidateId {
        &self.candidate_id
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Compatibility blurb for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub summary_text: String,
    pub generated_at: DateTime<Utc>,
    /// True when served from the provider's cache rather than freshly generated
    pub cached: bool,
}

/// Short-lived offer to reverse the most recent reject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoPrompt {
    pub decision_id: DecisionId,
    pub expires_at: DateTime<Utc>,
    pub candidate_name: String,
}

/// The viewer's own profile, used to seed insight generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerProfile {
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Which matching mode the candidate queue came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    #[default]
    Individual,
    Group,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Individual => write!(f, "individual"),
            QueueKind::Group => write!(f, "group"),
        }
    }
}
