// Core engine exports
pub mod collaborators;
pub mod dispatcher;
pub mod engine;
pub mod enrichment;
pub mod error;
pub mod resolver;
pub mod session;

pub use collaborators::{FeedbackSink, RecommendationSource, SwipeIndex};
pub use dispatcher::{Delivery, FeedbackAck, FeedbackDispatcher};
pub use engine::{ActiveSession, SmartMatchEngine, SwipeOutcome};
pub use enrichment::{categorize, enrich, suggest_activity};
pub use error::MatchError;
pub use resolver::MutualMatchResolver;
pub use session::{SessionState, SwipeSession};
