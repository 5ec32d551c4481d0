use std::sync::Arc;

use crate::core::collaborators::{FeedbackSink, RecommendationSource, SwipeIndex};
use crate::core::dispatcher::FeedbackDispatcher;
use crate::core::enrichment::enrich;
use crate::core::error::MatchError;
use crate::core::resolver::MutualMatchResolver;
use crate::core::session::SwipeSession;
use crate::models::{Decision, EnrichedCandidate, IntentScope, MutualMatchOutcome};

/// Result of one swipe
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeOutcome {
    pub decision: Decision,
    pub candidate_user_id: String,
    pub mutual_match: MutualMatchOutcome,
    pub exhausted: bool,
}

/// A swipe session together with its feedback dispatcher
///
/// Owned by a single user for the length of one matching flow.
pub struct ActiveSession<F> {
    swipes: SwipeSession,
    dispatcher: FeedbackDispatcher<F>,
}

impl<F> ActiveSession<F>
where
    F: FeedbackSink + 'static,
{
    pub fn swipes(&self) -> &SwipeSession {
        &self.swipes
    }

    pub fn owner(&self) -> &str {
        self.swipes.owner()
    }

    pub fn current(&self) -> Option<&EnrichedCandidate> {
        self.swipes.current()
    }

    pub fn dispatcher(&self) -> &FeedbackDispatcher<F> {
        &self.dispatcher
    }

    /// Move past the current candidate without sending feedback
    ///
    /// Used after a transmission failure when the user chooses to go on.
    pub fn skip(&mut self) -> Result<(), MatchError> {
        if let Some(current) = self.swipes.current() {
            tracing::info!("User {} skipped {} without feedback", self.swipes.owner(), current.user_id());
        }
        self.swipes.advance()
    }
}

/// Smart Match engine
///
/// # Flow
/// 1. One ranked batch is fetched when a session starts
/// 2. Each candidate is enriched, keeping the ranking order
/// 3. Each swipe sends feedback, and a like is checked for a mutual match
/// 4. The cursor advances until the session is exhausted
pub struct SmartMatchEngine<R, F, I> {
    source: Arc<R>,
    sink: Arc<F>,
    resolver: MutualMatchResolver<I>,
}

impl<R, F, I> Clone for SmartMatchEngine<R, F, I> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            sink: Arc::clone(&self.sink),
            resolver: self.resolver.clone(),
        }
    }
}

impl<R, F, I> SmartMatchEngine<R, F, I>
where
    R: RecommendationSource,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    pub fn new(source: Arc<R>, sink: Arc<F>, index: Arc<I>) -> Self {
        Self {
            source,
            sink,
            resolver: MutualMatchResolver::new(index),
        }
    }

    /// Build a session for `user_id` from one batch of recommendations
    ///
    /// # Arguments
    /// * `user_id` - The user who will swipe
    /// * `scope` - Intent scope passed through to the recommendation source
    /// * `limit` - Maximum number of candidates in the session
    ///
    /// # Returns
    /// A new session, or `SourceUnavailable` if the batch could not be fetched
    pub async fn start_session(
        &self,
        user_id: &str,
        scope: IntentScope,
        limit: usize,
    ) -> Result<ActiveSession<F>, MatchError> {
        let mut candidates = self
            .source
            .get_recommendations(user_id, scope, limit)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch recommendations for {}: {}", user_id, e);
                MatchError::SourceUnavailable(e.to_string())
            })?;

        candidates.truncate(limit);

        let queue: Vec<EnrichedCandidate> = candidates.into_iter().map(enrich).collect();

        tracing::info!(
            "Started session for {} with {} candidates (scope: {})",
            user_id,
            queue.len(),
            scope.as_str()
        );

        Ok(ActiveSession {
            swipes: SwipeSession::new(user_id, queue),
            dispatcher: FeedbackDispatcher::new(Arc::clone(&self.sink)),
        })
    }

    /// Apply a decision to the current candidate
    ///
    /// The cursor only moves once feedback is acknowledged. A like is then
    /// checked against the reciprocal-swipe index on the same detached task
    /// as the transmission, so a dropped caller cannot lose it. If an earlier
    /// swipe on this candidate was acknowledged after its caller went away,
    /// its recorded outcome is returned instead and `decision` is ignored.
    /// If the index lookup fails the session still advances, since the
    /// feedback is already on record.
    pub async fn swipe(
        &self,
        session: &mut ActiveSession<F>,
        decision: Decision,
    ) -> Result<SwipeOutcome, MatchError> {
        let current = session
            .swipes
            .current()
            .cloned()
            .ok_or(MatchError::OutOfRange {
                cursor: session.swipes.cursor(),
                len: session.swipes.size(),
            })?;
        let owner = session.owner().to_string();

        let ack = match session.dispatcher.acknowledged(&owner, current.user_id()) {
            Some(ack) => {
                tracing::info!(
                    "Swipe {} -> {} was already acknowledged ({}), advancing",
                    owner,
                    current.user_id(),
                    ack.event.decision
                );
                ack
            }
            None => {
                let resolver = self.resolver.clone();
                let candidate = current.clone();
                session
                    .dispatcher
                    .submit_then(&owner, &current, decision, move |event| async move {
                        resolver.resolve(&event.source_user_id, event.decision, &candidate).await
                    })
                    .await?
            }
        };

        session.swipes.advance()?;

        let mutual_match = ack.mutual_match?;

        Ok(SwipeOutcome {
            decision: ack.event.decision,
            candidate_user_id: ack.event.candidate_user_id,
            mutual_match,
            exhausted: session.swipes.is_exhausted(),
        })
    }
}
