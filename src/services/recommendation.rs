use crate::core::{FeedbackSink, RecommendationSource};
use crate::models::{Candidate, FeedbackEvent, IntentScope};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the recommendation engine
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl RecommendationError {
    /// Whether a retry could succeed
    fn is_transient(&self) -> bool {
        match self {
            RecommendationError::RequestError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RecommendationError::ApiError(_) => true,
            RecommendationError::Unauthorized | RecommendationError::InvalidResponse(_) => false,
        }
    }
}

/// Recommendation engine HTTP client
///
/// Serves as both collaborators on the engine's HTTP side:
/// - the ranked candidate source
/// - the feedback sink, retrying transient failures
pub struct RecommendationClient {
    base_url: String,
    api_key: String,
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl RecommendationClient {
    /// Create a new recommendation client
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Result<Self, RecommendationError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            max_retries,
            retry_backoff,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch a ranked batch of candidates
    pub async fn fetch_recommendations(
        &self,
        user_id: &str,
        scope: IntentScope,
        limit: usize,
    ) -> Result<Vec<Candidate>, RecommendationError> {
        let url = self.url("recommendations");

        tracing::debug!("Fetching {} recommendations for {} from {}", scope.as_str(), user_id, url);

        let response = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(&json!({
                "user_id": user_id,
                "recommendation_type": scope.as_str(),
                "limit": limit,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(RecommendationError::Unauthorized),
            status if !status.is_success() => {
                return Err(RecommendationError::ApiError(format!(
                    "Failed to fetch recommendations: {}",
                    status
                )));
            }
            _ => {}
        }

        let json: Value = response.json().await?;

        let items = json
            .get("recommendations")
            .and_then(|r| r.as_array())
            .ok_or_else(|| RecommendationError::InvalidResponse("Missing recommendations array".into()))?;

        let candidates: Vec<Candidate> = items
            .iter()
            .filter_map(|item| match serde_json::from_value::<Candidate>(item.clone()) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::warn!("Skipping malformed recommendation: {}", e);
                    None
                }
            })
            .filter(|c| {
                let in_range = (0.0..=1.0).contains(&c.compatibility_score);
                if !in_range {
                    tracing::warn!(
                        "Skipping recommendation {}: compatibility score {} outside 0..1",
                        c.user_id,
                        c.compatibility_score
                    );
                }
                in_range
            })
            .filter(|c| c.user_id != user_id)
            .collect();

        tracing::debug!("Received {} candidates for {}", candidates.len(), user_id);

        Ok(candidates)
    }

    /// Send one feedback event, retrying transient failures
    pub async fn send_feedback(&self, event: &FeedbackEvent) -> Result<(), RecommendationError> {
        let mut attempt = 0;

        loop {
            match self.send_feedback_once(event).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Feedback {} -> {} failed (attempt {}/{}): {}",
                        event.source_user_id,
                        event.candidate_user_id,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_feedback_once(&self, event: &FeedbackEvent) -> Result<(), RecommendationError> {
        let response = self
            .client
            .post(self.url("feedback"))
            .header("X-API-Key", &self.api_key)
            .json(&json!({
                "user_id": event.source_user_id,
                "recommended_user_id": event.candidate_user_id,
                "feedback_type": event.decision.as_str(),
                "created_at": event.created_at,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RecommendationError::Unauthorized),
            status if status.is_client_error() => Err(RecommendationError::InvalidResponse(format!(
                "Feedback rejected: {}",
                status
            ))),
            status if !status.is_success() => Err(RecommendationError::ApiError(format!(
                "Failed to submit feedback: {}",
                status
            ))),
            _ => Ok(()),
        }
    }
}

impl RecommendationSource for RecommendationClient {
    type Error = RecommendationError;

    async fn get_recommendations(
        &self,
        user_id: &str,
        scope: IntentScope,
        limit: usize,
    ) -> Result<Vec<Candidate>, RecommendationError> {
        self.fetch_recommendations(user_id, scope, limit).await
    }
}

impl FeedbackSink for RecommendationClient {
    type Error = RecommendationError;

    async fn submit_feedback(&self, event: &FeedbackEvent) -> Result<(), RecommendationError> {
        self.send_feedback(event).await
    }
}
