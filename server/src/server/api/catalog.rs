//! Read-only catalog endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::json;

use super::{ApiResult, err_json, with_db};
use crate::app::SharedState;

/// GET /video/{id}
pub async fn get_video(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| err_json(400, "Invalid video id"))?;
    let video = with_db(&state, move |db| db.get_video_by_id(id))
        .await?
        .ok_or_else(|| err_json(404, "Not found"))?;
    Ok(Json(json!(video)))
}

/// GET /playlist/{id}: internal id or YouTube playlist id.
pub async fn get_playlist(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult {
    let playlist = with_db(&state, move |db| {
        match db.resolve_playlist_id(&id)? {
            Some(playlist_id) => db.get_playlist_by_id(playlist_id),
            None => Ok(None),
        }
    })
    .await?
    .ok_or_else(|| err_json(404, "Not found"))?;
    Ok(Json(json!(playlist)))
}

/// GET /getvods
pub async fn get_vods(State(state): State<SharedState>) -> ApiResult {
    let streams = with_db(&state, |db| db.list_streams()).await?;
    Ok(Json(json!(streams)))
}
