//! Scripted collaborator doubles

use async_trait::async_trait;
use matchdeck_common::{CandidateId, Direction, Insight};
use matchdeck_engine::provider::{
    DecisionSink, InsightContext, InsightError, InsightProvider, SinkError, SwipeReceipt,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// How the provider answers for one candidate
#[derive(Debug, Clone)]
pub enum InsightReply {
    /// Lookup hits the cache
    Cached(String),
    /// Lookup misses, generation returns the text
    Generated(String),
    /// Lookup misses, generation fails
    GenerateFails,
    /// Lookup fails with a non-NotFound error
    LookupFails,
}

/// Insight provider with canned replies
///
/// Candidates without a reply answer `Generated("Insight for <id>")`.
/// A held candidate blocks inside `lookup` until released.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<HashMap<CandidateId, InsightReply>>,
    gates: Mutex<HashMap<CandidateId, Arc<Semaphore>>>,
    lookups: Mutex<Vec<CandidateId>>,
    generations: Mutex<Vec<(CandidateId, InsightContext)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, id: &str, reply: InsightReply) -> Self {
        self.replies.lock().unwrap().insert(id.into(), reply);
        self
    }

    /// Block lookups for `id` until [`release`](Self::release)
    pub fn hold(&self, id: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(id.into(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, id: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(&CandidateId::from(id)) {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn lookups(&self) -> Vec<CandidateId> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn generations(&self) -> Vec<(CandidateId, InsightContext)> {
        self.generations.lock().unwrap().clone()
    }

    fn reply_for(&self, id: &CandidateId) -> InsightReply {
        self.replies
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_else(|| InsightReply::Generated(format!("Insight for {}", id)))
    }
}

fn insight(text: &str, cached: bool) -> Insight {
    Insight {
        summary_text: text.to_string(),
        generated_at: matchdeck_common::time::now(),
        cached,
    }
}

#[async_trait]
impl InsightProvider for ScriptedProvider {
    async fn lookup(&self, candidate_id: &CandidateId) -> Result<Insight, InsightError> {
        self.lookups.lock().unwrap().push(candidate_id.clone());

        let gate = self.gates.lock().unwrap().get(candidate_id).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }

        match self.reply_for(candidate_id) {
            InsightReply::Cached(text) => Ok(insight(&text, true)),
            InsightReply::LookupFails => Err(InsightError::Request("HTTP 500".to_string())),
            InsightReply::Generated(_) | InsightReply::GenerateFails => {
                Err(InsightError::NotFound(candidate_id.clone()))
            }
        }
    }

    async fn generate(
        &self,
        candidate_id: &CandidateId,
        context: &InsightContext,
    ) -> Result<Insight, InsightError> {
        self.generations
            .lock()
            .unwrap()
            .push((candidate_id.clone(), context.clone()));

        match self.reply_for(candidate_id) {
            InsightReply::Generated(text) => Ok(insight(&text, false)),
            _ => Err(InsightError::Request("generation failed".to_string())),
        }
    }
}

/// Decision sink that remembers every call
#[derive(Default)]
pub struct RecordingSink {
    fail: bool,
    admirers: HashSet<CandidateId>,
    records: Mutex<Vec<(CandidateId, Direction)>>,
    retracts: Mutex<Vec<CandidateId>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `record` call fails (after being remembered)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_admirer(mut self, id: &str) -> Self {
        self.admirers.insert(id.into());
        self
    }

    pub fn records(&self) -> Vec<(CandidateId, Direction)> {
        self.records.lock().unwrap().clone()
    }

    pub fn retracts(&self) -> Vec<CandidateId> {
        self.retracts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionSink for RecordingSink {
    async fn record(
        &self,
        candidate_id: &CandidateId,
        direction: Direction,
    ) -> Result<SwipeReceipt, SinkError> {
        self.records
            .lock()
            .unwrap()
            .push((candidate_id.clone(), direction));

        if self.fail {
            return Err(SinkError::Rejected {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }

        let mutual_match = direction.is_accept() && self.admirers.contains(candidate_id);
        Ok(SwipeReceipt {
            mutual_match,
            message: mutual_match.then(|| format!("You and {} liked each other", candidate_id)),
        })
    }

    async fn retract(&self, candidate_id: &CandidateId) -> Result<(), SinkError> {
        self.retracts.lock().unwrap().push(candidate_id.clone());
        Ok(())
    }
}
