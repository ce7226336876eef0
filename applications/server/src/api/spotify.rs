/// Spotify account linking routes
///
/// Only reports whether server credentials are configured; there is no
/// user-level OAuth flow.
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub status: &'static str,
    pub configured: bool,
}

/// GET /spotify/auth-url
pub async fn auth_url(State(app_state): State<AppState>) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        status: "ok",
        configured: app_state.recommend_configured,
    })
}
