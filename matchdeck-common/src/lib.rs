//! # Matchdeck Common Library
//!
//! Shared code for the swipe engine and the hosts embedding it:
//! - Data model (candidates, decisions, insights, undo prompts)
//! - Event types (MatchEvent enum) and EventBus
//! - Configuration file resolution
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{
    Candidate, CandidateId, Decision, DecisionId, Direction, Insight, QueueKind, UndoPrompt,
    ViewerProfile,
};
