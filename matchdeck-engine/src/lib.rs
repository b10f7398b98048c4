//! # Matchdeck swipe engine (matchdeck-engine)
//!
//! Turns pointer gestures into accept/reject decisions over a ranked
//! candidate queue, keeps an undoable history of those decisions and
//! enriches the current candidate with an asynchronously fetched
//! compatibility insight.
//!
//! **Architecture:** a single-owner [`SwipeEngine`] coordinating a gesture
//! tracker, a decision history and an insight orchestrator. Background
//! work reports back through internal events; everything the UI needs is
//! published on the `matchdeck_common` event bus.

pub mod config;
pub mod error;
pub mod provider;
pub mod sim;
pub mod swipe;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use swipe::{EngineCommand, EngineHandle, Key, SwipeEngine};
