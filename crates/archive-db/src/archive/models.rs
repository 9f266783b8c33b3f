use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary row of one video's chat archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    pub id: i64,
    pub video_id: i64,
    pub youtube_id: String,
    pub twitch_video_id: Option<String>,
    pub total_messages: i64,
    /// Latest message time in seconds.
    pub duration: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub metadata_id: i64,
    pub message_count: usize,
}

/// One element of the `chat_messages.emotes` JSON column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEmoteRef {
    /// Global `chat_emotes.id`.
    pub id: i64,
    pub start: u32,
    pub end: u32,
}
