//! In-process collaborators for tests and local development.
//!
//! `MemorySwipeIndex` is only consistent within one process; deployments
//! with more than one instance need the Postgres or Redis index.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::{FeedbackSink, RecommendationSource, SwipeIndex};
use crate::models::{Candidate, FeedbackEvent, IntentScope};

/// Errors from in-process collaborators
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// Swipe index held in process memory
#[derive(Debug, Default)]
pub struct MemorySwipeIndex {
    likes: RwLock<HashSet<(String, String)>>,
    lookup_failures: AtomicUsize,
    record_failures: AtomicUsize,
}

impl MemorySwipeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.likes.read().await.len()
    }

    /// Make the next `n` lookups fail
    pub fn fail_next_lookups(&self, n: usize) {
        self.lookup_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` writes fail
    pub fn fail_next_records(&self, n: usize) {
        self.record_failures.store(n, Ordering::SeqCst);
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl SwipeIndex for MemorySwipeIndex {
    type Error = MemoryError;

    async fn has_liked(&self, liker: &str, likee: &str) -> Result<bool, MemoryError> {
        if take_failure(&self.lookup_failures) {
            return Err(MemoryError::Injected("swipe index unreachable".to_string()));
        }
        let likes = self.likes.read().await;
        Ok(likes.contains(&(liker.to_string(), likee.to_string())))
    }

    async fn record_like(&self, liker: &str, likee: &str) -> Result<(), MemoryError> {
        if take_failure(&self.record_failures) {
            return Err(MemoryError::Injected("swipe index unreachable".to_string()));
        }
        self.likes
            .write()
            .await
            .insert((liker.to_string(), likee.to_string()));
        Ok(())
    }
}

/// Recommendation source that serves a fixed batch
#[derive(Debug, Default)]
pub struct StaticSource {
    candidates: Vec<Candidate>,
    unavailable: bool,
}

impl StaticSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            unavailable: false,
        }
    }

    /// A source whose every fetch fails
    pub fn unavailable() -> Self {
        Self {
            candidates: vec![],
            unavailable: true,
        }
    }
}

impl RecommendationSource for StaticSource {
    type Error = MemoryError;

    async fn get_recommendations(
        &self,
        user_id: &str,
        _scope: IntentScope,
        limit: usize,
    ) -> Result<Vec<Candidate>, MemoryError> {
        if self.unavailable {
            return Err(MemoryError::Injected(format!("no recommendations for {}", user_id)));
        }

        Ok(self
            .candidates
            .iter()
            .filter(|c| c.user_id != user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Feedback sink that keeps what it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FeedbackEvent>>,
    failures: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingSink {
    /// A sink that takes `delay` to answer each submission
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make the next `n` submissions fail
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl FeedbackSink for RecordingSink {
    type Error = MemoryError;

    async fn submit_feedback(&self, event: &FeedbackEvent) -> Result<(), MemoryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if take_failure(&self.failures) {
            return Err(MemoryError::Injected("feedback sink unreachable".to_string()));
        }

        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_is_directional() {
        let index = MemorySwipeIndex::new();
        index.record_like("a", "b").await.unwrap();

        assert!(index.has_liked("a", "b").await.unwrap());
        assert!(!index.has_liked("b", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_like_is_idempotent() {
        let index = MemorySwipeIndex::new();
        index.record_like("a", "b").await.unwrap();
        index.record_like("a", "b").await.unwrap();

        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn test_injected_index_failures() {
        let index = MemorySwipeIndex::new();
        index.fail_next_lookups(1);
        index.fail_next_records(1);

        assert!(index.has_liked("a", "b").await.is_err());
        assert!(index.record_like("a", "b").await.is_err());
        index.record_like("a", "b").await.unwrap();
        assert!(index.has_liked("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_static_source_excludes_self() {
        let source = StaticSource::new(vec![
            Candidate::new("me", 0.9, vec![]),
            Candidate::new("you", 0.8, vec![]),
        ]);

        let batch = source.get_recommendations("me", IntentScope::Friends, 10).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].user_id, "you");
    }
}
