use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use smart_match::config::{IndexBackendKind, Settings};
use smart_match::core::SmartMatchEngine;
use smart_match::routes::{self, AppState};
use smart_match::services::{
    AuthVerifier, MemorySwipeIndex, PostgresSwipeIndex, RecommendationClient, RedisSwipeIndex,
    SessionRegistry, SwipeIndexBackend,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(settings: Option<&Settings>) {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| settings.map(|s| s.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .or_else(|| settings.map(|s| s.logging.format.clone()))
        .unwrap_or_else(|| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_index(settings: &Settings) -> std::io::Result<SwipeIndexBackend> {
    let backend = match settings.index.backend {
        IndexBackendKind::Postgres => {
            let db = &settings.database;
            let index = PostgresSwipeIndex::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;
            SwipeIndexBackend::Postgres(index)
        }
        IndexBackendKind::Redis => {
            let index = RedisSwipeIndex::new(&settings.cache.redis_url).await.map_err(|e| {
                error!("Failed to connect to Redis: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;
            SwipeIndexBackend::Redis(index)
        }
        IndexBackendKind::Memory => {
            warn!("Using in-memory swipe index: mutual matches are local to this process");
            SwipeIndexBackend::Memory(MemorySwipeIndex::new())
        }
    };

    if !backend.health_check().await {
        warn!("Swipe index ({}) failed its first health check", backend.name());
    }

    Ok(backend)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(None);
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(Some(&settings));

    info!("Starting Smart Match service...");

    let rec = &settings.recommendation;
    let client = Arc::new(
        RecommendationClient::new(
            rec.base_url.clone(),
            rec.api_key.clone(),
            Duration::from_secs(rec.timeout_secs),
            rec.max_retries,
            Duration::from_millis(rec.retry_backoff_ms),
        )
        .map_err(|e| {
            error!("Failed to create recommendation client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?,
    );

    info!("Recommendation client initialized ({})", rec.base_url);

    let index = Arc::new(build_index(&settings).await?);

    info!("Swipe index initialized ({})", index.name());

    let engine = SmartMatchEngine::new(Arc::clone(&client), Arc::clone(&client), index);

    let sessions = SessionRegistry::new(
        settings.cache.max_sessions,
        Duration::from_secs(settings.cache.session_ttl_secs),
    );

    info!(
        "Session registry initialized (max: {}, idle TTL: {}s)",
        settings.cache.max_sessions, settings.cache.session_ttl_secs
    );

    // Build application state
    let app_state = AppState {
        engine,
        sessions,
        auth: AuthVerifier::new(&settings.auth.jwt_secret, settings.auth.allowed_domains.clone()),
        default_limit: rec.default_limit,
        max_limit: rec.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<RecommendationClient, RecommendationClient, SwipeIndexBackend>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
