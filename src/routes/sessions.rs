use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::core::{ActiveSession, FeedbackSink, MatchError, RecommendationSource, SmartMatchEngine, SwipeIndex};
use crate::models::{AuthContext, CandidateCard, Decision, ErrorResponse, HealthResponse, MutualMatchOutcome, SessionResponse, StartSessionRequest, SwipeRequest, SwipeResponse};
use crate::services::{AuthError, AuthVerifier, SessionRegistry};

/// A session as hosted by the server
pub struct HostedSession<F> {
    pub active: ActiveSession<F>,
    /// Display-only campus of the owner
    pub campus: String,
}

/// Application state shared across all handlers
pub struct AppState<R, F, I> {
    pub engine: SmartMatchEngine<R, F, I>,
    pub sessions: SessionRegistry<HostedSession<F>>,
    pub auth: AuthVerifier,
    pub default_limit: u16,
    pub max_limit: u16,
}

impl<R, F, I> Clone for AppState<R, F, I> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            sessions: self.sessions.clone(),
            auth: self.auth.clone(),
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

/// Configure all session routes
pub fn configure<R, F, I>(cfg: &mut web::ServiceConfig)
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    cfg
        .route("/health", web::get().to(health_check))
        .route("/sessions", web::post().to(start_session::<R, F, I>))
        .route("/sessions/{id}", web::get().to(get_session::<R, F, I>))
        .route("/sessions/{id}", web::delete().to(end_session::<R, F, I>))
        .route("/sessions/{id}/swipe", web::post().to(swipe::<R, F, I>))
        .route("/sessions/{id}/skip", web::post().to(skip::<R, F, I>));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Start a session
///
/// POST /api/v1/sessions
///
/// Request body:
/// ```json
/// {
///   "intentScope": "friends|study|activities|dating",
///   "limit": 20
/// }
/// ```
/// An empty body starts a session with the defaults.
async fn start_session<R, F, I>(
    state: web::Data<AppState<R, F, I>>,
    body: web::Bytes,
    http_req: HttpRequest,
) -> HttpResponse
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    let auth = match authenticate(&state.auth, &http_req) {
        Ok(auth) => auth,
        Err(response) => return response,
    };

    let req = match parse_start_request(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for start_session request: {:?}", errors);
        return error_json(400, "Validation failed", errors.to_string());
    }

    let limit = req.limit.unwrap_or(state.default_limit).min(state.max_limit) as usize;
    let scope = req.intent_scope.unwrap_or_default();

    let active = match state.engine.start_session(&auth.user_id, scope, limit).await {
        Ok(active) => active,
        Err(e) => return match_error_response(&e),
    };

    let hosted = HostedSession {
        active,
        campus: auth.campus,
    };
    let mut body = session_response("", &hosted);

    let id = state.sessions.insert(hosted).await;
    body.session_id = id.clone();

    tracing::info!("Session {} opened for {} ({} candidates)", id, auth.user_id, body.total);

    HttpResponse::Created().json(body)
}

/// Current card of a session
///
/// GET /api/v1/sessions/{id}
async fn get_session<R, F, I>(
    state: web::Data<AppState<R, F, I>>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> HttpResponse
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    let auth = match authenticate(&state.auth, &http_req) {
        Ok(auth) => auth,
        Err(response) => return response,
    };
    let id = path.into_inner();

    let Some(entry) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    let hosted = entry.lock().await;
    if hosted.active.owner() != auth.user_id {
        return session_not_found(&id);
    }

    HttpResponse::Ok().json(session_response(&id, &hosted))
}

/// Swipe on the current card
///
/// POST /api/v1/sessions/{id}/swipe
///
/// Request body:
/// ```json
/// { "decision": "like|pass" }
/// ```
async fn swipe<R, F, I>(
    state: web::Data<AppState<R, F, I>>,
    path: web::Path<String>,
    req: web::Json<SwipeRequest>,
    http_req: HttpRequest,
) -> HttpResponse
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    let auth = match authenticate(&state.auth, &http_req) {
        Ok(auth) => auth,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        return error_json(400, "Validation failed", errors.to_string());
    }

    let decision: Decision = match req.decision.parse() {
        Ok(decision) => decision,
        Err(message) => return error_json(400, "Invalid decision", message),
    };

    let id = path.into_inner();
    let Some(entry) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    // Held for the whole swipe: one writer per session
    let mut hosted = entry.lock().await;
    if hosted.active.owner() != auth.user_id {
        return session_not_found(&id);
    }

    let outcome = match state.engine.swipe(&mut hosted.active, decision).await {
        Ok(outcome) => outcome,
        Err(e) => return match_error_response(&e),
    };

    let matched_card = match &outcome.mutual_match {
        MutualMatchOutcome::Matched(candidate) => Some(CandidateCard::from_enriched(candidate, &hosted.campus)),
        MutualMatchOutcome::None => None,
    };

    tracing::debug!(
        "Session {}: {} {} {} (matched: {})",
        id,
        auth.user_id,
        outcome.decision,
        outcome.candidate_user_id,
        matched_card.is_some()
    );

    HttpResponse::Ok().json(SwipeResponse {
        decision: outcome.decision,
        candidate_user_id: outcome.candidate_user_id,
        matched: matched_card.is_some(),
        matched_card,
        session: session_response(&id, &hosted),
    })
}

/// Move past the current card without feedback
///
/// POST /api/v1/sessions/{id}/skip
async fn skip<R, F, I>(
    state: web::Data<AppState<R, F, I>>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> HttpResponse
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    let auth = match authenticate(&state.auth, &http_req) {
        Ok(auth) => auth,
        Err(response) => return response,
    };
    let id = path.into_inner();

    let Some(entry) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    let mut hosted = entry.lock().await;
    if hosted.active.owner() != auth.user_id {
        return session_not_found(&id);
    }

    if let Err(e) = hosted.active.skip() {
        return match_error_response(&e);
    }

    HttpResponse::Ok().json(session_response(&id, &hosted))
}

/// Leave the matching flow
///
/// DELETE /api/v1/sessions/{id}
async fn end_session<R, F, I>(
    state: web::Data<AppState<R, F, I>>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> HttpResponse
where
    R: RecommendationSource + 'static,
    F: FeedbackSink + 'static,
    I: SwipeIndex + 'static,
{
    let auth = match authenticate(&state.auth, &http_req) {
        Ok(auth) => auth,
        Err(response) => return response,
    };
    let id = path.into_inner();

    let Some(entry) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    if entry.lock().await.active.owner() != auth.user_id {
        return session_not_found(&id);
    }

    state.sessions.remove(&id).await;
    tracing::info!("Session {} closed by {}", id, auth.user_id);

    HttpResponse::NoContent().finish()
}

fn session_response<F>(id: &str, hosted: &HostedSession<F>) -> SessionResponse
where
    F: FeedbackSink + 'static,
{
    let swipes = hosted.active.swipes();

    SessionResponse {
        session_id: id.to_string(),
        total: swipes.size(),
        position: (!swipes.is_exhausted()).then(|| swipes.position()),
        exhausted: swipes.is_exhausted(),
        card: swipes
            .current()
            .map(|candidate| CandidateCard::from_enriched(candidate, &hosted.campus)),
    }
}

fn parse_start_request(body: &[u8]) -> Result<StartSessionRequest, HttpResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartSessionRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::info!("Malformed start_session body: {}", e);
        error_json(400, "invalid_json", format!("Invalid JSON: {}", e))
    })
}

fn authenticate(verifier: &AuthVerifier, req: &HttpRequest) -> Result<AuthContext, HttpResponse> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    verifier.verify_header(header).map_err(|e| {
        tracing::info!("Authentication failed on {}: {}", req.path(), e);
        let status = match e {
            AuthError::DomainNotAllowed(_) => 403,
            _ => 401,
        };
        error_json(status, "Authentication failed", e.to_string())
    })
}

fn match_error_response(err: &MatchError) -> HttpResponse {
    let (status, error) = match err {
        MatchError::SourceUnavailable(_) => (502, "Recommendations unavailable"),
        MatchError::OutOfRange { .. } => (409, "Session exhausted"),
        MatchError::AlreadyResolved(_) => (409, "Candidate already resolved"),
        MatchError::TransmissionFailure(_) => (503, "Feedback not recorded"),
        MatchError::Index(_) => (500, "Match lookup failed"),
    };

    if status >= 500 {
        tracing::error!("{}: {}", error, err);
    } else {
        tracing::warn!("{}: {}", error, err);
    }

    error_json(status, error, err.to_string())
}

fn session_not_found(id: &str) -> HttpResponse {
    error_json(404, "Session not found", format!("No session {}", id))
}

fn error_json(status_code: u16, error: &str, message: String) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status_code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code,
    })
}
