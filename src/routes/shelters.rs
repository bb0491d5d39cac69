use crate::core::Matcher;
use crate::models::{
    ErrorResponse, FindSheltersRequest, FindSheltersResponse, HealthResponse, ShelterRecord,
    SessionShelterResponse,
};
use crate::services::{format_shortlist_message, MatchSession, SessionStore, SmsSender};
use actix_web::{web, HttpResponse, Responder};
use chrono::FixedOffset;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
    pub catalog: Arc<Vec<ShelterRecord>>,
    pub sessions: Arc<SessionStore>,
    pub sms: Option<Arc<SmsSender>>,
    /// Seeker-facing timezone as a fixed UTC offset
    pub timezone: FixedOffset,
}

/// Configure all shelter-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/shelters/find", web::post().to(find_shelters))
        .route(
            "/sessions/{session_id}/shelters/{index}",
            web::get().to(session_shelter),
        );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::trace!(
        "Health check ({} cached sessions)",
        state.sessions.entry_count()
    );

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find shelters endpoint
///
/// POST /api/v1/shelters/find
///
/// Runs the full matching pipeline once, caches the ranked shortlist under
/// a fresh session id, and fires the one-time SMS if the seeker consented.
/// An empty shortlist is a valid response, not an error.
async fn find_shelters(
    state: web::Data<AppState>,
    req: web::Json<FindSheltersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_shelters request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let profile = req.to_profile();

    tracing::info!(
        "Finding shelters in {} (urgency: {:?}, duration: {:?})",
        profile.city,
        profile.urgency,
        profile.duration
    );

    // Current date-time in the seeker-facing timezone drives availability
    let now = chrono::Utc::now()
        .with_timezone(&state.timezone)
        .naive_local();

    let result = state
        .matcher
        .find_shelters(&profile, state.catalog.as_ref().clone(), now)
        .await;

    if result.shortlist.is_empty() {
        tracing::info!(
            "No matches in {} ({} records considered)",
            profile.city,
            result.total_candidates
        );
    }

    let session = state
        .sessions
        .insert(MatchSession {
            id: Uuid::new_v4(),
            shortlist: result.shortlist,
            total_candidates: result.total_candidates,
            eligible_candidates: result.eligible_candidates,
            created_at: chrono::Utc::now(),
        })
        .await;

    // Fire-and-forget: notification failure never affects the response
    if let (Some(sender), Some(to)) = (state.sms.clone(), req.sms_destination()) {
        if !session.shortlist.is_empty() {
            let to = to.to_string();
            let body = format_shortlist_message(&session.shortlist);
            tokio::spawn(async move {
                if let Err(e) = sender.send(&to, &body).await {
                    tracing::warn!("Shortlist SMS to {} failed: {}", to, e);
                }
            });
        }
    }

    tracing::info!(
        "Returning {} shelters for session {} ({} eligible of {} records)",
        session.shortlist.len(),
        session.id,
        session.eligible_candidates,
        session.total_candidates
    );

    HttpResponse::Ok().json(FindSheltersResponse {
        session_id: session.id,
        shelters: session.shortlist.clone(),
        total_candidates: session.total_candidates,
        eligible_candidates: session.eligible_candidates,
    })
}

/// Serve one cached shortlist entry
///
/// GET /api/v1/sessions/{session_id}/shelters/{index}
///
/// Previous/next/reset navigation only moves the index the client asks
/// for; the cached shortlist is immutable and never rescored.
async fn session_shelter(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
) -> impl Responder {
    let (session_id, index) = path.into_inner();

    let session = match state.sessions.get(&session_id).await {
        Some(session) => session,
        None => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Session not found".to_string(),
                message: format!("No cached session {}", session_id),
                status_code: 404,
            });
        }
    };

    match session.shortlist.get(index) {
        Some(shelter) => HttpResponse::Ok().json(SessionShelterResponse {
            session_id,
            index,
            count: session.shortlist.len(),
            shelter: shelter.clone(),
        }),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Index out of range".to_string(),
            message: format!(
                "Session {} holds {} shelters",
                session_id,
                session.shortlist.len()
            ),
            status_code: 404,
        }),
    }
}
