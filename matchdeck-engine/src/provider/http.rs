//! HTTP collaborators backed by the matching service REST API
//!
//! Endpoints:
//! - `GET  {base}/matches/{candidate_id}/insight` (404 = not cached yet)
//! - `POST {base}/matches/{candidate_id}/insight` (generate)
//! - `POST {base}/matches/users/{viewer_id}/swipe`

use super::{DecisionSink, InsightContext, InsightError, InsightProvider, SinkError, SwipeReceipt};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use matchdeck_common::{CandidateId, Direction, Insight};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("matchdeck/", env!("CARGO_PKG_VERSION"));

fn build_client(timeout_ms: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| Error::Provider(e.to_string()))
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Insight provider talking to the matching service
pub struct HttpInsightProvider {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpInsightProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.request_timeout_ms)?,
            base_url: trim_base(&config.base_url),
        })
    }

    fn insight_url(&self, candidate_id: &CandidateId) -> String {
        format!("{}/matches/{}/insight", self.base_url, candidate_id)
    }

    async fn parse_insight(response: reqwest::Response) -> std::result::Result<Insight, InsightError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InsightError::Request(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json::<Insight>()
            .await
            .map_err(|e| InsightError::Parse(e.to_string()))
    }
}

#[async_trait]
impl InsightProvider for HttpInsightProvider {
    async fn lookup(&self, candidate_id: &CandidateId) -> std::result::Result<Insight, InsightError> {
        let url = self.insight_url(candidate_id);
        debug!(candidate_id = %candidate_id, url = %url, "Looking up cached insight");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| InsightError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(InsightError::NotFound(candidate_id.clone()));
        }

        Self::parse_insight(response).await
    }

    async fn generate(
        &self,
        candidate_id: &CandidateId,
        context: &InsightContext,
    ) -> std::result::Result<Insight, InsightError> {
        let url = self.insight_url(candidate_id);
        debug!(candidate_id = %candidate_id, mood = %context.mood, "Requesting insight generation");

        let response = self
            .http_client
            .post(&url)
            .json(context)
            .send()
            .await
            .map_err(|e| InsightError::Request(e.to_string()))?;

        Self::parse_insight(response).await
    }
}

/// Wire body of a swipe record
#[derive(Debug, Serialize)]
struct SwipeBody<'a> {
    target_user_id: &'a str,
    swiped_right: bool,
}

/// Decision sink posting swipes to the matching service
///
/// The service has no endpoint to withdraw a swipe, so `retract` keeps the
/// trait's no-op default.
pub struct HttpDecisionSink {
    http_client: reqwest::Client,
    base_url: String,
    viewer_id: String,
}

impl HttpDecisionSink {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.request_timeout_ms)?,
            base_url: trim_base(&config.base_url),
            viewer_id: config.viewer_id.clone(),
        })
    }

    fn swipe_url(&self) -> String {
        format!("{}/matches/users/{}/swipe", self.base_url, self.viewer_id)
    }
}

#[async_trait]
impl DecisionSink for HttpDecisionSink {
    async fn record(
        &self,
        candidate_id: &CandidateId,
        direction: Direction,
    ) -> std::result::Result<SwipeReceipt, SinkError> {
        let body = SwipeBody {
            target_user_id: candidate_id.as_str(),
            swiped_right: direction.is_accept(),
        };

        let response = self
            .http_client
            .post(self.swipe_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SwipeReceipt>()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))
    }
}
