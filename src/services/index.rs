use crate::core::SwipeIndex;
use crate::services::cache::{CacheError, RedisSwipeIndex};
use crate::services::memory::{MemoryError, MemorySwipeIndex};
use crate::services::postgres::{PostgresError, PostgresSwipeIndex};
use thiserror::Error;

/// Errors from whichever index backend is configured
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Postgres(#[from] PostgresError),

    #[error(transparent)]
    Redis(#[from] CacheError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Reciprocal-swipe index selected at startup
pub enum SwipeIndexBackend {
    Postgres(PostgresSwipeIndex),
    Redis(RedisSwipeIndex),
    Memory(MemorySwipeIndex),
}

impl SwipeIndexBackend {
    pub fn name(&self) -> &'static str {
        match self {
            SwipeIndexBackend::Postgres(_) => "postgres",
            SwipeIndexBackend::Redis(_) => "redis",
            SwipeIndexBackend::Memory(_) => "memory",
        }
    }

    /// Whether the backend can currently serve requests
    pub async fn health_check(&self) -> bool {
        match self {
            SwipeIndexBackend::Postgres(pg) => pg.health_check().await.unwrap_or(false),
            SwipeIndexBackend::Redis(redis) => redis.has_liked("__health__", "__health__").await.is_ok(),
            SwipeIndexBackend::Memory(_) => true,
        }
    }
}

impl SwipeIndex for SwipeIndexBackend {
    type Error = IndexError;

    async fn has_liked(&self, liker: &str, likee: &str) -> Result<bool, IndexError> {
        Ok(match self {
            SwipeIndexBackend::Postgres(pg) => pg.has_liked(liker, likee).await?,
            SwipeIndexBackend::Redis(redis) => redis.has_liked(liker, likee).await?,
            SwipeIndexBackend::Memory(memory) => memory.has_liked(liker, likee).await?,
        })
    }

    async fn record_like(&self, liker: &str, likee: &str) -> Result<(), IndexError> {
        match self {
            SwipeIndexBackend::Postgres(pg) => pg.record_like(liker, likee).await?,
            SwipeIndexBackend::Redis(redis) => redis.record_like(liker, likee).await?,
            SwipeIndexBackend::Memory(memory) => memory.record_like(liker, likee).await?,
        }
        Ok(())
    }
}
