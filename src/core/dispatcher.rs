use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::collaborators::FeedbackSink;
use crate::core::error::MatchError;
use crate::models::{Decision, EnrichedCandidate, FeedbackEvent, MutualMatchOutcome};

/// Acknowledgment of a delivered feedback event
///
/// Carries the result of whatever ran after the sink accepted the event.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackAck {
    pub event: FeedbackEvent,
    pub mutual_match: Result<MutualMatchOutcome, MatchError>,
}

/// Where feedback for one pair stands
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    InFlight,
    Acknowledged(FeedbackAck),
}

type Deliveries = Arc<Mutex<HashMap<(String, String), Delivery>>>;

/// Turns swipe decisions into feedback events, at most one per candidate
///
/// One dispatcher belongs to one session. The pair is marked in flight
/// under a plain mutex before the transmission is spawned, so two
/// submissions for the same pair can never both be in flight.
pub struct FeedbackDispatcher<F> {
    sink: Arc<F>,
    deliveries: Deliveries,
}

impl<F> FeedbackDispatcher<F>
where
    F: FeedbackSink + 'static,
{
    pub fn new(sink: Arc<F>) -> Self {
        Self {
            sink,
            deliveries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Send one feedback event for `candidate` with nothing to run after it
    pub async fn submit(
        &self,
        source_user_id: &str,
        candidate: &EnrichedCandidate,
        decision: Decision,
    ) -> Result<FeedbackAck, MatchError> {
        self.submit_then(source_user_id, candidate, decision, |_| async {
            Ok(MutualMatchOutcome::None)
        })
        .await
    }

    /// Send one feedback event for `candidate`, then run `after_ack`
    ///
    /// Transmission, `after_ack` and the bookkeeping for both run on their
    /// own task: if the caller goes away mid-flight, the pair still ends up
    /// either acknowledged or released. A `TransmissionFailure` releases the
    /// pair so the whole submit can be retried.
    pub async fn submit_then<A, Fut>(
        &self,
        source_user_id: &str,
        candidate: &EnrichedCandidate,
        decision: Decision,
        after_ack: A,
    ) -> Result<FeedbackAck, MatchError>
    where
        A: FnOnce(FeedbackEvent) -> Fut + Send + 'static,
        Fut: Future<Output = Result<MutualMatchOutcome, MatchError>> + Send + 'static,
    {
        let key = (source_user_id.to_string(), candidate.user_id().to_string());

        let claimed = {
            let mut deliveries = lock(&self.deliveries);
            if deliveries.contains_key(&key) {
                false
            } else {
                deliveries.insert(key.clone(), Delivery::InFlight);
                true
            }
        };
        if !claimed {
            tracing::warn!(
                "Duplicate feedback for {} -> {} rejected",
                source_user_id,
                candidate.user_id()
            );
            return Err(MatchError::AlreadyResolved(candidate.user_id().to_string()));
        }

        let event = FeedbackEvent::new(source_user_id, candidate.user_id(), decision);
        let sink = Arc::clone(&self.sink);
        let deliveries = Arc::clone(&self.deliveries);
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            match sink.submit_feedback(&event).await {
                Ok(()) => {
                    tracing::debug!(
                        "Feedback sent: {} -> {} ({})",
                        event.source_user_id,
                        event.candidate_user_id,
                        event.decision
                    );
                    let mutual_match = after_ack(event.clone()).await;
                    let ack = FeedbackAck { event, mutual_match };
                    lock(&deliveries).insert(task_key, Delivery::Acknowledged(ack.clone()));
                    Ok(ack)
                }
                Err(e) => {
                    tracing::warn!(
                        "Feedback for {} -> {} failed: {}",
                        event.source_user_id,
                        event.candidate_user_id,
                        e
                    );
                    lock(&deliveries).remove(&task_key);
                    Err(MatchError::TransmissionFailure(e.to_string()))
                }
            }
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Feedback task for {} -> {} aborted: {}", key.0, key.1, e);
                lock(&self.deliveries).remove(&key);
                Err(MatchError::TransmissionFailure(e.to_string()))
            }
        }
    }

    pub fn delivery(&self, source_user_id: &str, candidate_user_id: &str) -> Option<Delivery> {
        lock(&self.deliveries)
            .get(&(source_user_id.to_string(), candidate_user_id.to_string()))
            .cloned()
    }

    /// The acknowledgment for a pair whose submission already completed
    pub fn acknowledged(&self, source_user_id: &str, candidate_user_id: &str) -> Option<FeedbackAck> {
        match self.delivery(source_user_id, candidate_user_id) {
            Some(Delivery::Acknowledged(ack)) => Some(ack),
            _ => None,
        }
    }

    pub fn is_resolved(&self, source_user_id: &str, candidate_user_id: &str) -> bool {
        self.delivery(source_user_id, candidate_user_id).is_some()
    }

    pub fn resolved_count(&self) -> usize {
        lock(&self.deliveries).len()
    }
}

fn lock(deliveries: &Deliveries) -> MutexGuard<'_, HashMap<(String, String), Delivery>> {
    // The map is never left half-updated, so a poisoned lock is still usable
    deliveries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
