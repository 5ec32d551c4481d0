use crate::core::SwipeIndex;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur with Redis operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),
}

/// Redis-backed reciprocal-swipe index
///
/// Each user has a set `likes:{user}` of the users they liked.
/// Single-key commands give read-your-writes per pair on one primary.
pub struct RedisSwipeIndex {
    // Store ConnectionManager in a Mutex for interior mutability
    redis: Arc<Mutex<ConnectionManager>>,
}

impl RedisSwipeIndex {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(Mutex::new(redis)),
        })
    }
}

impl SwipeIndex for RedisSwipeIndex {
    type Error = CacheError;

    async fn has_liked(&self, liker: &str, likee: &str) -> Result<bool, CacheError> {
        let mut conn = self.redis.lock().await;
        let member: bool = redis::cmd("SISMEMBER")
            .arg(CacheKey::likes(liker))
            .arg(likee)
            .query_async(&mut *conn)
            .await?;
        Ok(member)
    }

    async fn record_like(&self, liker: &str, likee: &str) -> Result<(), CacheError> {
        let mut conn = self.redis.lock().await;
        redis::cmd("SADD")
            .arg(CacheKey::likes(liker))
            .arg(likee)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Recorded like in Redis: {} -> {}", liker, likee);
        Ok(())
    }
}

/// In-process registry of live sessions
///
/// Sessions are dropped after `idle_ttl` without access, or when evicted
/// by capacity. Each entry is behind an async mutex so one session only
/// ever has one writer at a time.
pub struct SessionRegistry<S> {
    sessions: moka::future::Cache<String, Arc<Mutex<S>>>,
}

impl<S> Clone for SessionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
        }
    }
}

impl<S> SessionRegistry<S>
where
    S: Send + 'static,
{
    pub fn new(max_sessions: u64, idle_ttl: Duration) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(idle_ttl)
            .build();

        Self { sessions }
    }

    /// Register a session under a fresh id
    pub async fn insert(&self, session: S) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .insert(id.clone(), Arc::new(Mutex::new(session)))
            .await;
        tracing::trace!("Session registered: {}", id);
        id
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<S>>> {
        self.sessions.get(id).await
    }

    /// Discard a session
    ///
    /// A swipe already in flight keeps its own handle and finishes against
    /// the detached session, which is then dropped.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).await.is_some()
    }

    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Set of users liked by `user_id`
    pub fn likes(user_id: &str) -> String {
        format!("likes:{}", user_id)
    }
}
