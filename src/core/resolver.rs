use std::sync::Arc;
use std::time::Duration;

use crate::core::collaborators::SwipeIndex;
use crate::core::error::MatchError;
use crate::models::{Decision, EnrichedCandidate, MutualMatchOutcome};

const RECORD_ATTEMPTS: u32 = 3;
const RECORD_BACKOFF: Duration = Duration::from_millis(20);

/// Decides whether a like completes a mutual match
///
/// Backed by the shared reciprocal-swipe index rather than session state,
/// since a match involves two independently owned sessions.
pub struct MutualMatchResolver<I> {
    index: Arc<I>,
}

impl<I> Clone for MutualMatchResolver<I> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
        }
    }
}

impl<I: SwipeIndex> MutualMatchResolver<I> {
    pub fn new(index: Arc<I>) -> Self {
        Self { index }
    }

    /// Resolve a decision by `source_user_id` on `candidate`
    ///
    /// A pass never matches and leaves the index alone. A like matches iff
    /// the candidate already liked the source; the like is recorded either
    /// way, with a few retries. A write that still fails is logged and does
    /// not hide the match. A failed lookup is returned as `Index` after the
    /// write has been attempted.
    pub async fn resolve(
        &self,
        source_user_id: &str,
        decision: Decision,
        candidate: &EnrichedCandidate,
    ) -> Result<MutualMatchOutcome, MatchError> {
        if decision == Decision::Pass {
            return Ok(MutualMatchOutcome::None);
        }

        let reciprocal = self
            .index
            .has_liked(candidate.user_id(), source_user_id)
            .await
            .map_err(|e| {
                tracing::error!("Reciprocal lookup {} -> {} failed: {}", candidate.user_id(), source_user_id, e);
                MatchError::Index(e.to_string())
            });

        if let Err(e) = self.record_with_retry(source_user_id, candidate.user_id()).await {
            tracing::error!("Like {} -> {} not recorded: {}", source_user_id, candidate.user_id(), e);
        }

        if reciprocal? {
            tracing::info!("Mutual match: {} <-> {}", source_user_id, candidate.user_id());
            Ok(MutualMatchOutcome::Matched(candidate.clone()))
        } else {
            Ok(MutualMatchOutcome::None)
        }
    }

    async fn record_with_retry(&self, liker: &str, likee: &str) -> Result<(), MatchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.index.record_like(liker, likee).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < RECORD_ATTEMPTS => {
                    tracing::warn!(
                        "Recording like {} -> {} failed (attempt {}/{}): {}",
                        liker,
                        likee,
                        attempt,
                        RECORD_ATTEMPTS,
                        e
                    );
                    tokio::time::sleep(RECORD_BACKOFF * attempt).await;
                }
                Err(e) => return Err(MatchError::Index(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enrichment::enrich;
    use crate::models::Candidate;
    use crate::services::memory::MemorySwipeIndex;

    fn candidate(id: &str) -> EnrichedCandidate {
        enrich(Candidate::new(id, 0.7, vec![]))
    }

    #[tokio::test]
    async fn test_first_like_does_not_match() {
        let index = Arc::new(MemorySwipeIndex::new());
        let resolver = MutualMatchResolver::new(Arc::clone(&index));

        let outcome = resolver.resolve("a", Decision::Like, &candidate("b")).await.unwrap();

        assert_eq!(outcome, MutualMatchOutcome::None);
        assert!(index.has_liked("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_reciprocal_like_matches() {
        let index = Arc::new(MemorySwipeIndex::new());
        let resolver = MutualMatchResolver::new(Arc::clone(&index));

        resolver.resolve("a", Decision::Like, &candidate("b")).await.unwrap();
        let outcome = resolver.resolve("b", Decision::Like, &candidate("a")).await.unwrap();

        match outcome {
            MutualMatchOutcome::Matched(c) => assert_eq!(c.user_id(), "a"),
            MutualMatchOutcome::None => panic!("expected a mutual match"),
        }
    }

    #[tokio::test]
    async fn test_pass_leaves_index_untouched() {
        let index = Arc::new(MemorySwipeIndex::new());
        let resolver = MutualMatchResolver::new(Arc::clone(&index));

        let outcome = resolver.resolve("a", Decision::Pass, &candidate("b")).await.unwrap();

        assert_eq!(outcome, MutualMatchOutcome::None);
        assert!(!index.has_liked("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_transient_write_failure_is_retried() {
        let index = Arc::new(MemorySwipeIndex::new());
        index.fail_next_records(RECORD_ATTEMPTS as usize - 1);
        let resolver = MutualMatchResolver::new(Arc::clone(&index));

        resolver.resolve("a", Decision::Like, &candidate("b")).await.unwrap();

        assert!(index.has_liked("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_match() {
        let index = Arc::new(MemorySwipeIndex::new());
        index.record_like("b", "a").await.unwrap();
        index.fail_next_records(RECORD_ATTEMPTS as usize);
        let resolver = MutualMatchResolver::new(Arc::clone(&index));

        let outcome = resolver.resolve("a", Decision::Like, &candidate("b")).await.unwrap();

        assert!(outcome.is_matched());
        assert!(!index.has_liked("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_lookup_still_records_like() {
        let index = Arc::new(MemorySwipeIndex::new());
        index.fail_next_lookups(1);
        let resolver = MutualMatchResolver::new(Arc::clone(&index));

        let err = resolver.resolve("a", Decision::Like, &candidate("b")).await.unwrap_err();

        assert!(matches!(err, MatchError::Index(_)));
        assert!(index.has_liked("a", "b").await.unwrap());
    }
}
