use serde::{Deserialize, Serialize};
use crate::models::domain::{Decision, EnrichedCandidate, MatchCategory};

/// Number of shared interests shown on a card
const MAX_CARD_INTERESTS: usize = 4;

/// Display form of an enriched candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCard {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "compatibilityPercent")]
    pub compatibility_percent: u8,
    pub category: MatchCategory,
    #[serde(rename = "categoryLabel")]
    pub category_label: String,
    pub explanation: String,
    #[serde(rename = "commonInterests")]
    pub common_interests: Vec<String>,
    #[serde(rename = "suggestedActivity")]
    pub suggested_activity: String,
    pub campus: String,
}

impl CandidateCard {
    pub fn from_enriched(enriched: &EnrichedCandidate, campus: &str) -> Self {
        let candidate = &enriched.candidate;
        let short_id: String = candidate.user_id.chars().take(8).collect();
        let percent = (candidate.compatibility_score.clamp(0.0, 1.0) * 100.0).round() as u8;

        Self {
            user_id: candidate.user_id.clone(),
            display_name: format!("Student {}", short_id),
            compatibility_percent: percent,
            category: enriched.category,
            category_label: enriched.category.label().to_string(),
            explanation: candidate.explanation.clone(),
            common_interests: candidate
                .common_interests
                .iter()
                .take(MAX_CARD_INTERESTS)
                .cloned()
                .collect(),
            suggested_activity: enriched.suggested_activity.clone(),
            campus: campus.to_string(),
        }
    }
}

/// Session state as seen by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub total: usize,
    /// 1-indexed position of the current card, absent once exhausted
    pub position: Option<usize>,
    pub exhausted: bool,
    pub card: Option<CandidateCard>,
}

/// Response for a swipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub decision: Decision,
    #[serde(rename = "candidateUserId")]
    pub candidate_user_id: String,
    pub matched: bool,
    #[serde(rename = "match")]
    pub matched_card: Option<CandidateCard>,
    pub session: SessionResponse,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
