/// Playlists API routes
use crate::{error::Result, error::ServerError, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use dj_core::{PlaylistId, PlaylistRecord, UserId};
use dj_pipeline::SubmitPlaylist;
use serde::{Deserialize, Serialize};

/// Most records returned by one listing
const MAX_LIST_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub status: &'static str,
    pub playlist_id: PlaylistId,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// POST /playlists/request
/// Validate a request and queue it for generation.
///
/// Body: `{"prompt": "...", "user_id": "...", "count": 20, "idempotency_key": "..."}`
/// where `count` and `idempotency_key` are optional.
pub async fn request_playlist(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<SubmitPlaylist>, JsonRejection>,
) -> Result<Json<QueuedResponse>> {
    let Json(req) = payload?;
    let accepted = app_state.intake.submit(req).await?;

    Ok(Json(QueuedResponse {
        status: "queued",
        playlist_id: accepted.playlist_id,
    }))
}

/// GET /playlists/:id
/// Get a generated playlist
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<PlaylistRecord>> {
    let playlist_id = PlaylistId::new(id);
    let record = app_state
        .store()?
        .get(&playlist_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("playlist not found".to_string()))?;

    Ok(Json(record))
}

/// GET /users/:user_id/playlists
/// A user's playlists in creation order
pub async fn list_user_playlists(
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PlaylistRecord>>> {
    let limit = query.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let records = app_state
        .store()?
        .list_by_user(&UserId::new(user_id), limit)
        .await?;

    Ok(Json(records))
}
