//! Collaborator seams of the engine.
//!
//! The engine never talks to a network or a database directly. Everything
//! outside the process goes through one of these traits, so a single
//! instance can be shared by every session on the server.

use std::future::Future;

use crate::models::{Candidate, FeedbackEvent, IntentScope};

/// Source of ranked, deduplicated candidates
pub trait RecommendationSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch up to `limit` candidates for `user_id`. Order is the ranking.
    fn get_recommendations(
        &self,
        user_id: &str,
        scope: IntentScope,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send;
}

/// Destination for swipe feedback
///
/// Delivery may be at-least-once; the dispatcher already guarantees one
/// logical submission per pair.
pub trait FeedbackSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn submit_feedback(
        &self,
        event: &FeedbackEvent,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Globally consistent record of who liked whom
pub trait SwipeIndex: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether `liker` has liked `likee`
    fn has_liked(
        &self,
        liker: &str,
        likee: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Record that `liker` liked `likee`. Idempotent.
    fn record_like(
        &self,
        liker: &str,
        likee: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
