use rusqlite::{Connection, OptionalExtension, Row};

use super::models::{NewVideo, Video, VideoDetails};
use crate::{Database, DbError};

pub(super) const VIDEO_COLUMNS: &str = "id, yt_id, twitch_id, name, description, duration, tags, \
     playlist_id, playlist_order, published_at, created_at";

pub(super) fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
    let tags_json: Option<String> = row.get(6)?;
    Ok(Video {
        id: row.get(0)?,
        youtube_id: row.get(1)?,
        twitch_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        duration: row.get(5)?,
        tags: tags_json
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default(),
        playlist_id: row.get(7)?,
        playlist_order: row.get(8)?,
        published_at: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Ids of a playlist's videos in playlist order. Videos without an order go
/// last, by id.
pub(super) fn playlist_video_ids(conn: &Connection, playlist_id: i64) -> Result<Vec<i64>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM videos
         WHERE playlist_id = ?1
         ORDER BY playlist_order IS NULL, playlist_order, id",
    )?;
    let rows = stmt.query_map([playlist_id], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Insert the video or update the one with the same YouTube id. Returns its
/// internal id.
pub(super) fn upsert_video_row(
    conn: &Connection,
    video: &NewVideo,
    playlist: Option<(i64, i64)>,
) -> Result<i64, DbError> {
    let tags = video.tags.as_ref().map(serde_json::to_string).transpose()?;
    let (playlist_id, playlist_order) = playlist.unzip();
    conn.query_row(
        "INSERT INTO videos (yt_id, twitch_id, name, description, duration, tags,
                             published_at, playlist_id, playlist_order)
         VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, '[]'), ?7, ?8, ?9)
         ON CONFLICT(yt_id) DO UPDATE SET
             twitch_id = COALESCE(excluded.twitch_id, videos.twitch_id),
             name = COALESCE(excluded.name, videos.name),
             description = COALESCE(excluded.description, videos.description),
             duration = COALESCE(excluded.duration, videos.duration),
             tags = COALESCE(?6, videos.tags),
             published_at = COALESCE(excluded.published_at, videos.published_at),
             playlist_id = COALESCE(excluded.playlist_id, videos.playlist_id),
             playlist_order = COALESCE(excluded.playlist_order, videos.playlist_order)
         RETURNING id",
        rusqlite::params![
            video.youtube_id,
            video.twitch_id.as_deref().filter(|id| !id.is_empty()),
            video.name,
            video.description,
            video.duration,
            tags,
            video.published_at,
            playlist_id,
            playlist_order,
        ],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

impl Database {
    /// Create or update a video keyed by its YouTube id.
    pub fn upsert_video(&self, video: &NewVideo) -> Result<i64, DbError> {
        if video.youtube_id.trim().is_empty() {
            return Err(DbError::InvalidData("video YouTube id is empty".into()));
        }
        self.with_conn(|conn| upsert_video_row(conn, video, None))
    }

    /// Video with its neighbours in playlist order.
    pub fn get_video_by_id(&self, video_id: i64) -> Result<Option<VideoDetails>, DbError> {
        self.with_conn(|conn| {
            let video = conn
                .query_row(
                    &format!("SELECT {} FROM videos WHERE id = ?1", VIDEO_COLUMNS),
                    [video_id],
                    video_from_row,
                )
                .optional()?;
            let Some(video) = video else {
                return Ok(None);
            };

            let siblings = match video.playlist_id {
                Some(playlist_id) => playlist_video_ids(conn, playlist_id)?,
                None => Vec::new(),
            };
            let details = match siblings.iter().position(|&id| id == video_id) {
                Some(index) => VideoDetails {
                    order: index + 1,
                    total: siblings.len(),
                    prev_id: index.checked_sub(1).map(|prev| siblings[prev]),
                    next_id: siblings.get(index + 1).copied(),
                    video,
                },
                None => VideoDetails {
                    order: 1,
                    total: 1,
                    prev_id: None,
                    next_id: None,
                    video,
                },
            };
            Ok(Some(details))
        })
    }
}
