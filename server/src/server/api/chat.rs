//! Chat archive retrieval and upload.

use std::time::Instant;

use archive_db::VideoIdentifier;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use chat_parser::ChatInput;
use serde::Deserialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;

use super::{ApiError, ApiResult, err_json, with_db};
use crate::app::SharedState;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Default, Deserialize)]
pub struct ChatWindowQuery {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadChatBody {
    /// Internal id, as a number or a numeric string.
    #[serde(default)]
    pub video_id: Option<Value>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub twitch_id: Option<String>,
    #[serde(default)]
    pub chat_data: Option<Value>,
}

async fn resolve_video(state: &SharedState, video: &str) -> Result<i64, ApiError> {
    let Some(identifier) = VideoIdentifier::parse(video) else {
        return Err(err_json(400, "Invalid video id"));
    };
    with_db(state, move |db| db.resolve_video_id(&identifier))
        .await?
        .ok_or_else(|| err_json(404, "Video not found"))
}

/// GET /chat/{video}?start=&end=
pub async fn get_chat(
    State(state): State<SharedState>,
    Path(video): Path<String>,
    Query(q): Query<ChatWindowQuery>,
) -> ApiResult {
    let video_id = resolve_video(&state, &video).await?;
    let start = q.start.unwrap_or(0);
    let document = with_db(&state, move |db| db.get_chat_by_video_id(video_id, start, q.end))
        .await?
        .ok_or_else(|| err_json(404, "No chat archive for this video"))?;
    Ok(Json(json!(document)))
}

/// GET /chat/{video}/metadata
pub async fn get_chat_metadata(
    State(state): State<SharedState>,
    Path(video): Path<String>,
) -> ApiResult {
    let video_id = resolve_video(&state, &video).await?;
    let metadata = with_db(&state, move |db| db.get_chat_metadata(video_id))
        .await?
        .ok_or_else(|| err_json(404, "No chat archive for this video"))?;
    Ok(Json(json!(metadata)))
}

/// POST /admin/chat/upload
pub async fn upload_chat(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<UploadChatBody>, JsonRejection>,
) -> ApiResult {
    ingest(state, &headers, None, payload).await
}

/// POST /admin/chat/upload/{video}
pub async fn upload_chat_for_video(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(video): Path<String>,
    payload: Result<Json<UploadChatBody>, JsonRejection>,
) -> ApiResult {
    ingest(state, &headers, Some(video), payload).await
}

fn check_api_key(state: &SharedState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config().admin_api_key.as_deref() else {
        return Err(err_json(503, "Chat upload is disabled"));
    };
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !api_key_matches(provided, expected) {
        tracing::warn!("Rejected chat upload with an invalid API key");
        return Err(err_json(401, "Invalid API key"));
    }
    Ok(())
}

fn api_key_matches(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn body_video_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Candidates in priority order: path segment, `video_id`, `youtube_id`,
/// `twitch_id`.
fn upload_candidates(path_video: Option<&str>, body: &UploadChatBody) -> Vec<VideoIdentifier> {
    let mut candidates = Vec::new();
    if let Some(identifier) = path_video.and_then(VideoIdentifier::parse) {
        candidates.push(identifier);
    }
    if let Some(id) = body.video_id.as_ref().and_then(body_video_id) {
        candidates.push(VideoIdentifier::Internal(id));
    }
    if let Some(youtube_id) = non_blank(&body.youtube_id) {
        candidates.push(VideoIdentifier::YouTube(youtube_id.to_string()));
    }
    if let Some(twitch_id) = non_blank(&body.twitch_id) {
        candidates.push(VideoIdentifier::Twitch(twitch_id.to_string()));
    }
    candidates
}

async fn ingest(
    state: SharedState,
    headers: &HeaderMap,
    path_video: Option<String>,
    payload: Result<Json<UploadChatBody>, JsonRejection>,
) -> ApiResult {
    check_api_key(&state, headers)?;
    let Json(body) = payload.map_err(|rejection| err_json(400, &rejection.body_text()))?;

    let candidates = upload_candidates(path_video.as_deref(), &body);
    let Some(chat_data) = body.chat_data else {
        return Err(err_json(400, "chat_data is required"));
    };
    if candidates.is_empty() {
        return Err(err_json(
            400,
            "Provide a video id in the URL or body, a youtube_id, or a twitch_id",
        ));
    }

    let (video_id, twitch_video_id) = with_db(&state, move |db| {
        for candidate in &candidates {
            if let Some(video_id) = db.resolve_video_id(candidate)? {
                let twitch_video_id = candidates
                    .iter()
                    .find_map(VideoIdentifier::twitch_id)
                    .map(str::to_string);
                return Ok(Some((video_id, twitch_video_id)));
            }
        }
        Ok(None)
    })
    .await?
    .ok_or_else(|| err_json(404, "Could not find video for the given identifiers"))?;

    let document = tokio::task::spawn_blocking(move || {
        ChatInput::from_value(chat_data).map(ChatInput::into_document)
    })
    .await
    .map_err(|e| {
        tracing::error!("Chat parse task failed: {e}");
        err_json(500, "Chat parse task failed")
    })?
    .map_err(|e| err_json(400, &e.to_string()))?;

    if document.is_empty() {
        return Err(err_json(400, "No chat messages found in data"));
    }

    let stats = document.stats();
    let deadline = Instant::now() + state.config().ingest_timeout;
    let result = with_db(&state, move |db| {
        db.save_chat_data_within(video_id, &document, twitch_video_id.as_deref(), deadline)
    })
    .await?;

    tracing::info!(
        video_id,
        messages = result.message_count,
        users = stats.users,
        "Chat archive uploaded"
    );
    Ok(Json(json!({
        "success": true,
        "videoId": video_id,
        "messageCount": result.message_count,
        "metadataId": result.metadata_id,
        "stats": stats,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::test_support::{TEST_API_KEY, error_body, test_state};
    use archive_db::catalog::NewVideo;
    use axum::body::Body;
    use axum::extract::{FromRequest, Request};
    use axum::http::HeaderValue;

    fn auth_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(TEST_API_KEY));
        headers
    }

    fn raw_chat() -> Value {
        json!([
            {
                "message_type": "text_message",
                "time_in_seconds": 5.7,
                "author": { "display_name": "Bob", "colour": "#112233" },
                "message": "hi"
            },
            {
                "message_type": "text_message",
                "time_in_seconds": 65.0,
                "author": { "display_name": "Alice" },
                "message": "later"
            }
        ])
    }

    fn add_video(state: &SharedState, youtube_id: &str, twitch_id: Option<&str>) -> i64 {
        state
            .db()
            .upsert_video(&NewVideo {
                youtube_id: youtube_id.into(),
                twitch_id: twitch_id.map(str::to_string),
                ..NewVideo::default()
            })
            .unwrap()
    }

    fn upload_body(chat_data: Value) -> UploadChatBody {
        UploadChatBody {
            chat_data: Some(chat_data),
            ..UploadChatBody::default()
        }
    }

    #[tokio::test]
    async fn upload_then_fetch_window() {
        let state = test_state();
        let video_id = add_video(&state, "yt-1", None);

        let Json(uploaded) = upload_chat_for_video(
            State(state.clone()),
            auth_headers(),
            Path("yt-1".into()),
            Ok(Json(upload_body(raw_chat()))),
        )
        .await
        .unwrap();
        assert_eq!(uploaded["success"], true);
        assert_eq!(uploaded["videoId"], video_id);
        assert_eq!(uploaded["messageCount"], 2);
        assert_eq!(uploaded["stats"]["users"], 2);

        let Json(window) = get_chat(
            State(state.clone()),
            Path(video_id.to_string()),
            Query(ChatWindowQuery {
                start: Some(0),
                end: Some(60),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            window,
            json!({
                "badgeList": [],
                "emoteList": [],
                "userList": [{ "name": "Bob", "color": "#112233" }],
                "chatList": [{ "time": 5, "user": 0, "message": "hi" }]
            })
        );
    }

    #[tokio::test]
    async fn upload_resolves_twitch_id_and_records_it() {
        let state = test_state();
        let video_id = add_video(&state, "yt-1", Some("2012345678"));

        let body = UploadChatBody {
            twitch_id: Some("2012345678".into()),
            ..upload_body(raw_chat())
        };
        let Json(uploaded) = upload_chat(State(state.clone()), auth_headers(), Ok(Json(body)))
            .await
            .unwrap();
        assert_eq!(uploaded["videoId"], video_id);

        let Json(metadata) = get_chat_metadata(State(state), Path("twitch:2012345678".into()))
            .await
            .unwrap();
        assert_eq!(metadata["twitchVideoId"], "2012345678");
        assert_eq!(metadata["youtubeId"], "yt-1");
        assert_eq!(metadata["totalMessages"], 2);
        assert_eq!(metadata["duration"], 65);
    }

    #[tokio::test]
    async fn upload_accepts_normalized_documents() {
        let state = test_state();
        let video_id = add_video(&state, "yt-1", None);
        let document = json!({
            "badgeList": [],
            "emoteList": [],
            "userList": [{ "name": "Bob", "color": "#112233" }],
            "chatList": [{ "time": 3, "user": 0, "message": "hello" }]
        });

        let body = UploadChatBody {
            video_id: Some(json!(video_id.to_string())),
            ..upload_body(document.clone())
        };
        upload_chat(State(state.clone()), auth_headers(), Ok(Json(body)))
            .await
            .unwrap();

        let Json(window) = get_chat(
            State(state),
            Path("yt-1".into()),
            Query(ChatWindowQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(window, document);
    }

    #[tokio::test]
    async fn upload_requires_api_key() {
        let state = test_state();
        add_video(&state, "yt-1", None);

        let err = upload_chat_for_video(
            State(state.clone()),
            HeaderMap::new(),
            Path("yt-1".into()),
            Ok(Json(upload_body(raw_chat()))),
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, 401);
        assert_eq!(body["status"], "error");
        assert!(!state.db().has_chat_data(1).unwrap());
    }

    #[tokio::test]
    async fn upload_rejects_bad_payloads() {
        let state = test_state();
        add_video(&state, "yt-1", None);

        let cases = [
            (Some("yt-1"), UploadChatBody::default(), 400),
            (None, upload_body(raw_chat()), 400),
            (Some("yt-1"), upload_body(json!("not chat")), 400),
            (Some("yt-1"), upload_body(json!([{ "message_type": "sub" }])), 400),
            (Some("missing"), upload_body(raw_chat()), 404),
        ];
        for (path, body, expected) in cases {
            let payload = Ok(Json(body));
            let err = ingest(state.clone(), &auth_headers(), path.map(str::to_string), payload)
                .await
                .unwrap_err();
            let (status, _) = error_body(err).await;
            assert_eq!(status, expected, "path {:?}", path);
        }
        assert!(!state.db().has_chat_data(1).unwrap());
    }

    async fn json_payload(body: &'static str) -> Result<Json<UploadChatBody>, JsonRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/admin/chat/upload/yt-1")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<UploadChatBody>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn malformed_upload_json_gets_json_error() {
        let state = test_state();
        add_video(&state, "yt-1", None);

        let err = upload_chat_for_video(
            State(state.clone()),
            auth_headers(),
            Path("yt-1".into()),
            json_payload("{\"chat_data\": [").await,
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, 400);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));

        let err = upload_chat_for_video(
            State(state.clone()),
            HeaderMap::new(),
            Path("yt-1".into()),
            json_payload("{").await,
        )
        .await
        .unwrap_err();
        assert_eq!(error_body(err).await.0, 401);
        assert!(!state.db().has_chat_data(1).unwrap());
    }

    #[test]
    fn api_key_comparison() {
        assert!(api_key_matches(TEST_API_KEY, TEST_API_KEY));
        assert!(!api_key_matches("", TEST_API_KEY));
        assert!(!api_key_matches(&TEST_API_KEY[1..], TEST_API_KEY));
        assert!(!api_key_matches("test-key-0123456780", TEST_API_KEY));
    }

    #[tokio::test]
    async fn missing_archive_is_404() {
        let state = test_state();
        add_video(&state, "yt-1", None);

        let err = get_chat(
            State(state.clone()),
            Path("yt-1".into()),
            Query(ChatWindowQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(error_body(err).await.0, 404);

        let err = get_chat(
            State(state),
            Path("unknown".into()),
            Query(ChatWindowQuery::default()),
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "Video not found");
    }

    #[test]
    fn candidates_follow_priority() {
        let body = UploadChatBody {
            video_id: Some(json!(7)),
            youtube_id: Some("yt".into()),
            twitch_id: Some(" ".into()),
            chat_data: None,
        };
        assert_eq!(
            upload_candidates(Some("twitch:99"), &body),
            vec![
                VideoIdentifier::Twitch("99".into()),
                VideoIdentifier::Internal(7),
                VideoIdentifier::YouTube("yt".into()),
            ]
        );
    }
}
