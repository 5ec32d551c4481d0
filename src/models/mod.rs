// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AuthContext, Candidate, Decision, EnrichedCandidate, FeedbackEvent, IntentScope, MatchCategory, MutualMatchOutcome};
pub use requests::{StartSessionRequest, SwipeRequest};
pub use responses::{CandidateCard, ErrorResponse, HealthResponse, SessionResponse, SwipeResponse};
