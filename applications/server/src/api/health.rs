/// Health check API routes
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Server time as epoch seconds
    pub time: i64,
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        time: chrono::Utc::now().timestamp(),
    })
}
