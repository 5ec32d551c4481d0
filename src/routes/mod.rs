// Route exports
pub mod sessions;

use actix_web::web;
use crate::core::{FeedbackSink, RecommendationSource, SwipeIndex};

pub use sessions::{AppState, HostedSession};

pub fn configure_routes<R, F, I>(cfg: &mut web::ServiceConfig)
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    cfg.service(
        web::scope("/api/v1")
            .configure(sessions::configure::<R, F, I>),
    );
}
