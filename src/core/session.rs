use crate::core::error::MatchError;
use crate::models::EnrichedCandidate;

/// Where a session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A candidate is on screen at this 0-based cursor
    Active { cursor: usize },
    /// Every candidate has been shown. Terminal.
    Exhausted,
}

/// Ordered candidate queue with a forward-only cursor
///
/// The queue is fixed for the lifetime of the session and keeps the ranking
/// order it was built with. The only transition is `advance`, which moves the
/// cursor forward by one until it reaches `size()`. There is no refill: a new
/// session must be built to see more candidates.
#[derive(Debug, Clone)]
pub struct SwipeSession {
    owner: String,
    queue: Vec<EnrichedCandidate>,
    cursor: usize,
}

impl SwipeSession {
    pub fn new(owner: impl Into<String>, queue: Vec<EnrichedCandidate>) -> Self {
        Self {
            owner: owner.into(),
            queue,
            cursor: 0,
        }
    }

    /// User this session was built for
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Candidate under the cursor, or `None` once exhausted
    pub fn current(&self) -> Option<&EnrichedCandidate> {
        self.queue.get(self.cursor)
    }

    pub fn state(&self) -> SessionState {
        if self.is_exhausted() {
            SessionState::Exhausted
        } else {
            SessionState::Active { cursor: self.cursor }
        }
    }

    /// Move to the next candidate
    ///
    /// Fails with `OutOfRange` when already exhausted and leaves the state
    /// untouched.
    pub fn advance(&mut self) -> Result<(), MatchError> {
        if self.is_exhausted() {
            return Err(MatchError::OutOfRange {
                cursor: self.cursor,
                len: self.queue.len(),
            });
        }

        self.cursor += 1;
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.queue.len()
    }

    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// 1-indexed display position (`cursor + 1`)
    pub fn position(&self) -> usize {
        self.cursor + 1
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
