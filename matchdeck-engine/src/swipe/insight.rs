//! Insight orchestrator
//!
//! Per-candidate asynchronous enrichment. Each request bumps a generation
//! counter; the spawned fetch carries the counter it was started with and
//! its result is applied only if the counter still matches. In-flight
//! fetches are never aborted, only ignored.
//!
//! While a fetch is outstanding a trait preview cycles on a fixed cadence.

use super::events::{InsightOutcome, InternalEvent};
use super::preview::trait_sequence;
use super::timers::ScheduledTask;
use crate::provider::{InsightContext, InsightError, InsightProvider};
use matchdeck_common::{Candidate, CandidateId, Insight, QueueKind, ViewerProfile};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Snapshot of what the UI should show for the current candidate
#[derive(Debug, Clone, PartialEq)]
pub struct InsightView {
    pub candidate_id: Option<CandidateId>,
    pub insight: Option<Insight>,
    /// Fetched summary, else the candidate's precomputed hint
    pub display_text: Option<String>,
    pub loading: bool,
    pub traits: Vec<String>,
    pub trait_index: usize,
}

impl InsightView {
    pub fn active_trait(&self) -> Option<&str> {
        self.traits.get(self.trait_index).map(String::as_str)
    }
}

pub struct InsightOrchestrator {
    provider: Arc<dyn InsightProvider>,
    tx: UnboundedSender<InternalEvent>,
    trait_period: Duration,
    viewer: Option<ViewerProfile>,
    kind: QueueKind,
    generation: u64,
    target: Option<Candidate>,
    insight: Option<Insight>,
    loading: bool,
    traits: Vec<String>,
    trait_index: usize,
    cycle: ScheduledTask,
}

impl InsightOrchestrator {
    pub fn new(
        provider: Arc<dyn InsightProvider>,
        tx: UnboundedSender<InternalEvent>,
        trait_period: Duration,
    ) -> Self {
        Self {
            provider,
            tx,
            trait_period,
            viewer: None,
            kind: QueueKind::default(),
            generation: 0,
            target: None,
            insight: None,
            loading: false,
            traits: trait_sequence(None),
            trait_index: 0,
            cycle: ScheduledTask::idle(),
        }
    }

    pub fn set_viewer(&mut self, viewer: Option<ViewerProfile>) {
        self.viewer = viewer;
    }

    pub fn set_kind(&mut self, kind: QueueKind) {
        self.kind = kind;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Begin enrichment for `candidate`, superseding any earlier request
    ///
    /// A request for the candidate that is already loading or resolved is
    /// ignored. `None` clears the visible insight. Returns true when the
    /// visible state changed.
    pub fn request(&mut self, candidate: Option<&Candidate>) -> bool {
        let same_target = match (candidate, self.target.as_ref()) {
            (Some(next), Some(current)) => next.id == current.id,
            _ => false,
        };
        if same_target && (self.loading || self.insight.is_some()) {
            debug!(candidate_id = ?candidate.map(|c| &c.id), "Insight already requested");
            return false;
        }

        self.generation += 1;
        self.cycle.cancel();
        self.insight = None;
        self.trait_index = 0;
        self.traits = trait_sequence(candidate);
        self.target = candidate.cloned();

        let Some(candidate) = candidate else {
            self.loading = false;
            return true;
        };

        self.loading = true;
        let generation = self.generation;
        self.cycle = ScheduledTask::every(self.tx.clone(), self.trait_period, move || {
            InternalEvent::TraitTick { generation }
        });

        let context = InsightContext::for_candidate(candidate, self.viewer.as_ref(), self.kind);
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        let candidate_id = candidate.id.clone();
        debug!(candidate_id = %candidate_id, generation, "Requesting insight");

        tokio::spawn(async move {
            let outcome = fetch_insight(provider.as_ref(), &candidate_id, &context).await;
            let _ = tx.send(InternalEvent::InsightResolved {
                generation,
                candidate_id,
                outcome,
            });
        });

        true
    }

    /// Drop the visible insight and ignore whatever is in flight
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.cycle.cancel();
        self.target = None;
        self.insight = None;
        self.loading = false;
        self.traits = trait_sequence(None);
        self.trait_index = 0;
    }

    /// Apply a resolved fetch; stale results are discarded
    pub fn apply(
        &mut self,
        generation: u64,
        candidate_id: &CandidateId,
        outcome: InsightOutcome,
    ) -> bool {
        let current = self.target.as_ref().map(|c| &c.id);
        if generation != self.generation || current != Some(candidate_id) {
            debug!(
                candidate_id = %candidate_id,
                generation,
                current_generation = self.generation,
                "Discarding stale insight"
            );
            return false;
        }

        self.loading = false;
        self.cycle.cancel();
        self.trait_index = 0;
        if let InsightOutcome::Ready(insight) = outcome {
            self.insight = Some(insight);
        }
        true
    }

    /// Advance the trait preview; returns the new index
    pub fn tick(&mut self, generation: u64) -> Option<usize> {
        if generation != self.generation || !self.loading || self.traits.is_empty() {
            return None;
        }
        self.trait_index = (self.trait_index + 1) % self.traits.len();
        Some(self.trait_index)
    }

    pub fn view(&self) -> InsightView {
        let display_text = self
            .insight
            .as_ref()
            .map(|i| i.summary_text.clone())
            .or_else(|| self.target.as_ref().and_then(|c| c.insight_hint.clone()));

        InsightView {
            candidate_id: self.target.as_ref().map(|c| c.id.clone()),
            insight: self.insight.clone(),
            display_text,
            loading: self.loading,
            traits: self.traits.clone(),
            trait_index: self.trait_index,
        }
    }
}

/// Cache-first lookup with generation fallback
///
/// Only `NotFound` triggers generation. Every other failure is logged and
/// leaves the insight absent; there is no retry.
pub async fn fetch_insight(
    provider: &dyn InsightProvider,
    candidate_id: &CandidateId,
    context: &InsightContext,
) -> InsightOutcome {
    match provider.lookup(candidate_id).await {
        Ok(insight) => InsightOutcome::Ready(insight),
        Err(InsightError::NotFound(_)) => {
            debug!(candidate_id = %candidate_id, "No cached insight, generating");
            match provider.generate(candidate_id, context).await {
                Ok(insight) => InsightOutcome::Ready(insight),
                Err(e) => {
                    warn!(candidate_id = %candidate_id, error = %e, "Insight generation failed");
                    InsightOutcome::Unavailable
                }
            }
        }
        Err(e) => {
            warn!(candidate_id = %candidate_id, error = %e, "Insight lookup failed");
            InsightOutcome::Unavailable
        }
    }
}
