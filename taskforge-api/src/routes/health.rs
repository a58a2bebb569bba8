/// API banner and health check endpoints
///
/// Provides the unauthenticated surface of the server:
/// - `GET /` answers with a short banner so load balancers and humans can
///   tell the service is up
/// - `GET /health` verifies database connectivity and degrades to 503
///   when the database is unreachable
use crate::app::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskforge_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    pub status: String,

    /// Database status: "up" or "down"
    pub database: String,
}

/// Banner handler
///
/// # Example
///
/// ```text
/// GET /
/// ```
///
/// Response:
/// ```json
/// {
///   "message": "Project Management API running",
///   "status": "OK"
/// }
/// ```
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Project Management API running",
        "status": "OK",
    }))
}

/// Health check handler
///
/// Returns service health status including database connectivity. The
/// response carries a 503 when the database check fails, so orchestration
/// probes fail over without parsing the body.
///
/// # Example
///
/// ```text
/// GET /health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "database": "up"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match pool::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: "up".to_string(),
            }),
        ),
        Err(err) => {
            tracing::warn!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    database: "down".to_string(),
                }),
            )
        }
    }
}
