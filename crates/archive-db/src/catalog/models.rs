use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub youtube_id: String,
    pub twitch_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Duration as reported by YouTube, e.g. `PT1H2M3S`.
    pub duration: Option<String>,
    pub tags: Vec<String>,
    pub playlist_id: Option<i64>,
    pub playlist_order: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A video with its position inside its playlist.
///
/// A video outside any playlist is reported as `order = 1` of `total = 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(flatten)]
    pub video: Video,
    /// 1-based position.
    pub order: usize,
    pub total: usize,
    pub prev_id: Option<i64>,
    pub next_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetails {
    pub id: i64,
    pub youtube_id: String,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub videos: Vec<Video>,
}

/// One game entry of the catalog listing. `playlist_id` and `first_video`
/// are YouTube ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    pub stream_id: i64,
    pub game_name: String,
    pub tags: Vec<String>,
    pub playlist_id: Option<String>,
    pub streams: i64,
    pub date_completed: Option<DateTime<Utc>>,
    pub first_video: Option<String>,
    pub game_cover: Option<String>,
}

/// Fields for creating or updating a video keyed by its YouTube id. `None`
/// keeps the stored value on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub youtube_id: String,
    #[serde(default)]
    pub twitch_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Playlist description file, as produced by the YouTube playlist export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistImport {
    /// YouTube playlist id.
    pub playlist_id: String,
    pub game_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub game_cover: Option<String>,
    /// Completion date of the stream; defaults to the last video's
    /// publication date.
    #[serde(default)]
    pub date_override: Option<DateTime<Utc>>,
    #[serde(default)]
    pub videos: Vec<PlaylistVideo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    /// YouTube video id.
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistImportResult {
    pub playlist_id: i64,
    /// Internal ids in playlist order.
    pub video_ids: Vec<i64>,
    pub stream_created: bool,
}
