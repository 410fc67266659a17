use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

use crate::core::Matcher;
use crate::models::{
    DiagnoseRequest, DiagnoseResponse, ErrorResponse, HealthResponse, MatchRequest, StoredDiagnosis,
};
use crate::services::{CacheKey, CacheManager, PostgresClient, PostgresError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
}

/// Configure all support-matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/match", web::post().to(match_supports))
        .route("/diagnose", web::post().to(diagnose))
        .route("/diagnose/{id}", web::get().to(get_diagnosis));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);
    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Stateless matching against caller-supplied candidates
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "profile": { "userType": "business", "businessType": "음식점업", ... },
///   "candidates": [ { "id": "s-1", "title": "...", "organization": "...", ... } ]
/// }
/// ```
async fn match_supports(
    matcher: web::Data<Matcher>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let MatchRequest { profile, candidates } = req.into_inner();
    let matcher = matcher.into_inner();
    let result = web::block(move || matcher.find_matches(&profile, &candidates)).await;

    match result {
        Ok(result) => {
            tracing::info!(
                "Matched {} of {} candidates ({} tailored)",
                result.total_count,
                result.total_analyzed,
                result.tailored.len()
            );
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            tracing::error!("Matching task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Matching failed", e.to_string())
        }
    }
}

/// Diagnose a profile against the stored catalog and persist the outcome
///
/// POST /api/v1/diagnose
async fn diagnose(
    state: web::Data<AppState>,
    matcher: web::Data<Matcher>,
    req: web::Json<DiagnoseRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for diagnose request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let start = Instant::now();
    let DiagnoseRequest { profile, email } = req.into_inner();

    let candidates = match state.postgres.get_active_candidates().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to load supports: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load supports",
                e.to_string(),
            );
        }
    };

    let matcher = matcher.into_inner();
    let run_profile = profile.clone();
    let result = match web::block(move || matcher.find_matches(&run_profile, &candidates)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Matching task failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Matching failed", e.to_string());
        }
    };

    let stored = match state
        .postgres
        .save_diagnosis(&profile, email.as_deref(), &result)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!("Failed to save diagnosis: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save diagnosis",
                e.to_string(),
            );
        }
    };

    if let Err(e) = state.cache.set(&CacheKey::diagnosis(&stored.id), &stored).await {
        tracing::warn!("Failed to cache diagnosis {}: {}", stored.id, e);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Diagnosis {} completed in {}ms: {} tailored, {} recommended, {} exploratory",
        stored.id,
        duration_ms,
        result.tailored.len(),
        result.recommended.len(),
        result.exploratory.len()
    );

    HttpResponse::Ok().json(DiagnoseResponse {
        id: stored.id,
        result,
        duration_ms,
    })
}

/// Fetch a stored diagnosis, cache first
///
/// GET /api/v1/diagnose/{id}
async fn get_diagnosis(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let key = CacheKey::diagnosis(&id);

    match state.cache.get::<StoredDiagnosis>(&key).await {
        Ok(Some(stored)) => return HttpResponse::Ok().json(stored),
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache lookup failed for {}: {}", key, e),
    }

    match state.postgres.get_diagnosis(&id).await {
        Ok(stored) => {
            if let Err(e) = state.cache.set(&key, &stored).await {
                tracing::warn!("Failed to cache diagnosis {}: {}", id, e);
            }
            HttpResponse::Ok().json(stored)
        }
        Err(PostgresError::NotFound(message)) => {
            error_response(StatusCode::NOT_FOUND, "Diagnosis not found", message)
        }
        Err(PostgresError::InvalidInput(message)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid diagnosis id", message)
        }
        Err(e) => {
            tracing::error!("Failed to fetch diagnosis {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch diagnosis",
                e.to_string(),
            )
        }
    }
}
