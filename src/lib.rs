//! Smart Match - recommendation-consumption engine for campus social matching
//!
//! This library takes ranked candidates from an external recommendation
//! engine, enriches them with a relationship category, serves them one at a
//! time in a swipe session, and turns swipes into feedback and mutual matches.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{enrich, ActiveSession, MatchError, SmartMatchEngine, SwipeOutcome, SwipeSession};
pub use models::{Candidate, Decision, EnrichedCandidate, MatchCategory, MutualMatchOutcome};
