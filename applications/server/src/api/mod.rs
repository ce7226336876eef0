/// API route modules
pub mod health;
pub mod playlists;
pub mod spotify;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the HTTP router
pub fn router(app_state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/playlists/request", post(playlists::request_playlist))
        .route("/playlists/:id", get(playlists::get_playlist))
        .route(
            "/users/:user_id/playlists",
            get(playlists::list_user_playlists),
        )
        .route("/spotify/auth-url", get(spotify::auth_url))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(cors_layer(allowed_origins))
        .with_state(app_state)
}

/// CORS restricted to `allowed_origins`; `"*"` allows any origin
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
