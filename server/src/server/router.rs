use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use super::api;
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let upload_limit = state.config().max_upload_bytes;
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Chat ---
        .route("/chat/{video}", get(api::chat::get_chat))
        .route("/chat/{video}/metadata", get(api::chat::get_chat_metadata))
        .merge(build_upload_routes(upload_limit))
        // --- Catalog ---
        .route("/video/{id}", get(api::catalog::get_video))
        .route("/playlist/{id}", get(api::catalog::get_playlist))
        .route("/getvods", get(api::catalog::get_vods))
        .fallback(not_found_fallback)
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn build_upload_routes(limit: usize) -> Router<SharedState> {
    Router::new()
        .route("/admin/chat/upload", post(api::chat::upload_chat))
        .route("/admin/chat/upload/{video}", post(api::chat::upload_chat_for_video))
        .layer(DefaultBodyLimit::max(limit))
}

async fn status_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::get_version()
    }))
}

async fn not_found_fallback(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "error": "Not Found",
            "path": uri.path(),
        })),
    )
}
