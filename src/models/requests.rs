use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::IntentScope;

/// Request to start a swipe session
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[serde(default)]
    #[serde(alias = "intent_scope", rename = "intentScope")]
    pub intent_scope: Option<IntentScope>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to record a swipe on the current candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1))]
    pub decision: String,
}
