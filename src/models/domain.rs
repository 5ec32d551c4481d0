use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ranked candidate as returned by the recommendation engine
///
/// Treated as immutable input; the engine never edits a candidate, it only
/// derives an [`EnrichedCandidate`] from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
    #[serde(rename = "compatibilityScore", alias = "compatibility_score")]
    pub compatibility_score: f64,
    #[serde(rename = "commonInterests", alias = "common_interests", default)]
    pub common_interests: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

impl Candidate {
    pub fn new(user_id: impl Into<String>, compatibility_score: f64, common_interests: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            compatibility_score,
            common_interests,
            explanation: String::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

/// Relationship-intent category assigned during enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    StudyBuddy,
    ActivityPartner,
    Friend,
    PotentialDate,
}

impl MatchCategory {
    /// Human-readable badge text
    pub fn label(&self) -> &'static str {
        match self {
            MatchCategory::StudyBuddy => "Study Buddy",
            MatchCategory::ActivityPartner => "Activity Partner",
            MatchCategory::Friend => "Friend",
            MatchCategory::PotentialDate => "Potential Date",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchCategory::StudyBuddy => "study_buddy",
            MatchCategory::ActivityPartner => "activity_partner",
            MatchCategory::Friend => "friend",
            MatchCategory::PotentialDate => "potential_date",
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate plus the derived category and activity suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub category: MatchCategory,
    #[serde(rename = "suggestedActivity")]
    pub suggested_activity: String,
}

impl EnrichedCandidate {
    pub fn user_id(&self) -> &str {
        &self.candidate.user_id
    }
}

/// A swipe decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Like,
    Pass,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Like => "like",
            Decision::Pass => "pass",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(Decision::Like),
            "pass" => Ok(Decision::Pass),
            other => Err(format!("unknown decision '{}', expected like or pass", other)),
        }
    }
}

/// Feedback notification sent to the recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    #[serde(rename = "userId")]
    pub source_user_id: String,
    #[serde(rename = "recommendedUserId")]
    pub candidate_user_id: String,
    #[serde(rename = "feedbackType")]
    pub decision: Decision,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FeedbackEvent {
    pub fn new(source_user_id: &str, candidate_user_id: &str, decision: Decision) -> Self {
        Self {
            source_user_id: source_user_id.to_string(),
            candidate_user_id: candidate_user_id.to_string(),
            decision,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Result attached to a `like` decision
#[derive(Debug, Clone, PartialEq)]
pub enum MutualMatchOutcome {
    None,
    Matched(EnrichedCandidate),
}

impl MutualMatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, MutualMatchOutcome::Matched(_))
    }
}

/// Which slice of the recommendation engine a session draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentScope {
    #[default]
    Friends,
    Study,
    Activities,
    Dating,
}

impl IntentScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentScope::Friends => "friends",
            IntentScope::Study => "study",
            IntentScope::Activities => "activities",
            IntentScope::Dating => "dating",
        }
    }
}

/// Authenticated user and profile fields used for display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub campus: String,
}
