use thiserror::Error;

/// Errors raised by the matching engine
///
/// None of these are fatal to the service: each one is local to a single
/// candidate or a single session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The recommendation fetch failed, so no session could be built
    #[error("Recommendation source unavailable: {0}")]
    SourceUnavailable(String),

    /// `advance` was called on an exhausted session
    #[error("Session exhausted: cursor {cursor} is at the end of a queue of {len}")]
    OutOfRange { cursor: usize, len: usize },

    /// Feedback was already taken for this candidate in this session
    #[error("Candidate {0} already resolved in this session")]
    AlreadyResolved(String),

    /// The feedback sink could not be reached
    #[error("Feedback transmission failed: {0}")]
    TransmissionFailure(String),

    /// The reciprocal-swipe index could not be read or written
    #[error("Swipe index error: {0}")]
    Index(String),
}

impl MatchError {
    /// Whether the caller may retry or let the user proceed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MatchError::SourceUnavailable(_) | MatchError::TransmissionFailure(_) | MatchError::Index(_)
        )
    }
}
