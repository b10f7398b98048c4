//! Undo/redo stack of committed decisions
//!
//! `past` is most-recent-last, `future` is most-recently-undone-first.
//! Any fresh push invalidates `future`.

use matchdeck_common::Decision;
use std::collections::VecDeque;

#[derive(Debug, Default, Clone)]
pub struct DecisionHistory {
    past: Vec<Decision>,
    future: VecDeque<Decision>,
}

impl DecisionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh decision; clears the redo stack
    pub fn push(&mut self, decision: Decision) {
        self.past.push(decision);
        self.future.clear();
    }

    /// Move the most recent decision to the front of `future`
    pub fn undo(&mut self) -> Option<Decision> {
        let decision = self.past.pop()?;
        self.future.push_front(decision.clone());
        Some(decision)
    }

    /// Move the first `future` entry back onto `past`
    pub fn redo(&mut self) -> Option<Decision> {
        let decision = self.future.pop_front()?;
        self.past.push(decision.clone());
        Some(decision)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Most recent decision still in effect
    pub fn last(&self) -> Option<&Decision> {
        self.past.last()
    }

    pub fn past(&self) -> &[Decision] {
        &self.past
    }

    pub fn future(&self) -> impl Iterator<Item = &Decision> {
        self.future.iter()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}
