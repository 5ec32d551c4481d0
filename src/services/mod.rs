// Service exports
pub mod auth;
pub mod cache;
pub mod index;
pub mod memory;
pub mod postgres;
pub mod recommendation;

pub use auth::{AuthError, AuthVerifier};
pub use cache::{CacheError, CacheKey, RedisSwipeIndex, SessionRegistry};
pub use index::{IndexError, SwipeIndexBackend};
pub use memory::{MemorySwipeIndex, RecordingSink, StaticSource};
pub use postgres::{PostgresError, PostgresSwipeIndex};
pub use recommendation::{RecommendationClient, RecommendationError};
