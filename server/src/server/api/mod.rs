//! REST API handlers grouped by domain.

pub mod catalog;
pub mod chat;

use archive_db::{Database, DbError};
use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::app::SharedState;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Map a store error onto a response: bad input is 400, a missing row 404,
/// anything else 500.
pub fn db_error(err: DbError) -> ApiError {
    match err {
        DbError::InvalidData(msg) => err_json(400, &msg),
        DbError::NotFound(what) => err_json(404, &format!("Not found: {what}")),
        other => {
            tracing::error!("Database error: {other}");
            err_json(500, &other.to_string())
        }
    }
}

/// Run a store call on the blocking thread pool.
pub async fn with_db<F, R>(state: &SharedState, f: F) -> Result<R, ApiError>
where
    F: FnOnce(&Database) -> Result<R, DbError> + Send + 'static,
    R: Send + 'static,
{
    let db = state.db().clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            tracing::error!("Database task failed: {e}");
            err_json(500, "Database task failed")
        })?
        .map_err(db_error)
}

#[cfg(test)]
pub(crate) mod test_support {
    use archive_db::Database;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use serde_json::Value;

    use crate::app::SharedState;
    use crate::config::AppConfig;

    pub const TEST_API_KEY: &str = "test-key-0123456789";

    pub fn test_state() -> SharedState {
        let db = Database::open_in_memory().expect("Failed to create test DB");
        let mut config = AppConfig::defaults(std::path::Path::new("."));
        config.admin_api_key = Some(TEST_API_KEY.into());
        SharedState::new(db, config)
    }

    /// Status and decoded JSON body of a handler error.
    pub async fn error_body(err: super::ApiError) -> (u16, Value) {
        let response = err.into_response();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
