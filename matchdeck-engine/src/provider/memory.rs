//! In-memory collaborators
//!
//! Used by the simulator and by hosts running without a backend. The insight
//! provider behaves like the remote cache: lookups miss until an insight is
//! generated (or seeded), after which they hit with `cached = true`.

use super::{DecisionSink, InsightContext, InsightError, InsightProvider, SinkError, SwipeReceipt};
use async_trait::async_trait;
use matchdeck_common::{CandidateId, Direction, Insight};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Insight cache backed by a map
#[derive(Default)]
pub struct MemoryInsightProvider {
    cache: RwLock<HashMap<CandidateId, Insight>>,
}

impl MemoryInsightProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the cache
    pub async fn seed(&self, candidate_id: CandidateId, summary_text: impl Into<String>) {
        let insight = Insight {
            summary_text: summary_text.into(),
            generated_at: matchdeck_common::time::now(),
            cached: true,
        };
        self.cache.write().await.insert(candidate_id, insight);
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl InsightProvider for MemoryInsightProvider {
    async fn lookup(&self, candidate_id: &CandidateId) -> Result<Insight, InsightError> {
        self.cache
            .read()
            .await
            .get(candidate_id)
            .cloned()
            .ok_or_else(|| InsightError::NotFound(candidate_id.clone()))
    }

    async fn generate(
        &self,
        candidate_id: &CandidateId,
        context: &InsightContext,
    ) -> Result<Insight, InsightError> {
        let names: Vec<&str> = context.participants.iter().map(|p| p.name.as_str()).collect();
        let summary_text = match context.shared_interests.first() {
            Some(interest) => format!(
                "{} could bond over {} around {}.",
                names.join(" and "),
                interest,
                context.location
            ),
            None => format!("{} share a {} vibe.", names.join(" and "), context.mood),
        };

        let generated = Insight {
            summary_text,
            generated_at: matchdeck_common::time::now(),
            cached: false,
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            candidate_id.clone(),
            Insight {
                cached: true,
                ..generated.clone()
            },
        );
        debug!(candidate_id = %candidate_id, "Generated in-memory insight");

        Ok(generated)
    }
}

/// Decision sink that keeps every record in memory
///
/// Candidates listed as admirers answer with a mutual match when accepted.
#[derive(Default)]
pub struct MemoryDecisionSink {
    admirers: HashSet<CandidateId>,
    records: RwLock<Vec<(CandidateId, Direction)>>,
}

impl MemoryDecisionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admirers<I>(admirers: I) -> Self
    where
        I: IntoIterator<Item = CandidateId>,
    {
        Self {
            admirers: admirers.into_iter().collect(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of every record still in place
    pub async fn records(&self) -> Vec<(CandidateId, Direction)> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl DecisionSink for MemoryDecisionSink {
    async fn record(
        &self,
        candidate_id: &CandidateId,
        direction: Direction,
    ) -> Result<SwipeReceipt, SinkError> {
        self.records.write().await.push((candidate_id.clone(), direction));

        let mutual_match = direction.is_accept() && self.admirers.contains(candidate_id);
        Ok(SwipeReceipt {
            mutual_match,
            message: mutual_match.then(|| "It's a match!".to_string()),
        })
    }

    async fn retract(&self, candidate_id: &CandidateId) -> Result<(), SinkError> {
        let mut records = self.records.write().await;
        if let Some(pos) = records.iter().rposition(|(id, _)| id == candidate_id) {
            records.remove(pos);
        }
        Ok(())
    }
}
