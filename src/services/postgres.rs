use crate::core::SwipeIndex;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// PostgreSQL-backed reciprocal-swipe index
///
/// One row per directed like. Every instance of the service shares the same
/// primary, so a like written by one session is visible to the next lookup
/// from any other.
pub struct PostgresSwipeIndex {
    pool: PgPool,
}

impl PostgresSwipeIndex {
    /// Connect and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Connect using optional settings values
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL swipe index");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Whether `liker` has liked `likee`
    pub async fn exists(&self, liker: &str, likee: &str) -> Result<bool, PostgresError> {
        let query = r#"
            SELECT EXISTS (
                SELECT 1 FROM swipe_likes
                WHERE liker_id = $1 AND likee_id = $2
            ) AS liked
        "#;

        let row = sqlx::query(query)
            .bind(liker)
            .bind(likee)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("liked"))
    }

    /// Record a like
    ///
    /// Uses INSERT ... ON CONFLICT DO NOTHING so repeating a like keeps the
    /// original timestamp.
    pub async fn insert(&self, liker: &str, likee: &str) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO swipe_likes (liker_id, likee_id, liked_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (liker_id, likee_id) DO NOTHING
        "#;

        sqlx::query(query)
            .bind(liker)
            .bind(likee)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Recorded like: {} -> {}", liker, likee);

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl SwipeIndex for PostgresSwipeIndex {
    type Error = PostgresError;

    async fn has_liked(&self, liker: &str, likee: &str) -> Result<bool, PostgresError> {
        self.exists(liker, likee).await
    }

    async fn record_like(&self, liker: &str, likee: &str) -> Result<(), PostgresError> {
        self.insert(liker, likee).await
    }
}
