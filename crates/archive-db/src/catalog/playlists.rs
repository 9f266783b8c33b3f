use rusqlite::{Connection, OptionalExtension};

use super::models::{
    NewVideo, PlaylistDetails, PlaylistImport, PlaylistImportResult, StreamSummary,
};
use super::videos::{VIDEO_COLUMNS, upsert_video_row, video_from_row};
use crate::{Database, DbError};

fn decode_tags(json: Option<String>) -> Vec<String> {
    json.and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

impl Database {
    /// Playlist header with its videos in playlist order.
    pub fn get_playlist_by_id(&self, playlist_id: i64) -> Result<Option<PlaylistDetails>, DbError> {
        self.with_conn(|conn| {
            let header = conn
                .query_row(
                    "SELECT id, youtube_id, name, tags FROM playlists WHERE id = ?1",
                    [playlist_id],
                    |row| {
                        Ok(PlaylistDetails {
                            id: row.get(0)?,
                            youtube_id: row.get(1)?,
                            name: row.get(2)?,
                            tags: decode_tags(row.get(3)?),
                            videos: Vec::new(),
                        })
                    },
                )
                .optional()?;
            let Some(mut playlist) = header else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM videos
                 WHERE playlist_id = ?1
                 ORDER BY playlist_order IS NULL, playlist_order, id",
                VIDEO_COLUMNS
            ))?;
            let rows = stmt.query_map([playlist_id], video_from_row)?;
            playlist.videos = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(Some(playlist))
        })
    }

    /// Games catalog, most recently completed first.
    pub fn list_streams(&self) -> Result<Vec<StreamSummary>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.game_name, s.tags, p.youtube_id, s.stream_count,
                        s.date_completed, v.yt_id, s.game_cover
                 FROM streams s
                 LEFT JOIN playlists p ON s.playlist_id = p.id
                 LEFT JOIN videos v ON s.first_video_id = v.id
                 ORDER BY s.date_completed IS NULL, s.date_completed DESC, s.id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(StreamSummary {
                    stream_id: row.get(0)?,
                    game_name: row.get(1)?,
                    tags: decode_tags(row.get(2)?),
                    playlist_id: row.get(3)?,
                    streams: row.get::<_, Option<i64>>(4)?.unwrap_or(1),
                    date_completed: row.get(5)?,
                    first_video: row.get(6)?,
                    game_cover: row.get(7)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// Store a playlist and its videos in one transaction.
    ///
    /// Videos are upserted by YouTube id with their position as
    /// `playlist_order`. A stream entry is created only if the playlist has
    /// none yet.
    pub fn import_playlist(&self, import: &PlaylistImport) -> Result<PlaylistImportResult, DbError> {
        if import.playlist_id.trim().is_empty() {
            return Err(DbError::InvalidData("playlist YouTube id is empty".into()));
        }
        if let Some(video) = import.videos.iter().find(|v| v.video_id.trim().is_empty()) {
            return Err(DbError::InvalidData(format!(
                "playlist video {:?} has an empty YouTube id",
                video.title
            )));
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let playlist_id: i64 = tx.query_row(
                "INSERT INTO playlists (youtube_id, name, tags) VALUES (?1, ?2, ?3)
                 ON CONFLICT(youtube_id) DO UPDATE SET name = excluded.name, tags = excluded.tags
                 RETURNING id",
                rusqlite::params![
                    import.playlist_id,
                    import.game_name,
                    serde_json::to_string(&import.tags)?
                ],
                |row| row.get(0),
            )?;

            let mut video_ids = Vec::with_capacity(import.videos.len());
            for (order, video) in import.videos.iter().enumerate() {
                let new_video = NewVideo {
                    youtube_id: video.video_id.clone(),
                    name: video.title.clone(),
                    description: video.description.clone(),
                    duration: video.duration.clone(),
                    published_at: video.published_at,
                    ..NewVideo::default()
                };
                let id = upsert_video_row(&tx, &new_video, Some((playlist_id, order as i64)))?;
                tracing::debug!(playlist_id, order, video_id = id, "Imported playlist video");
                video_ids.push(id);
            }

            let stream_created = if stream_exists(&tx, playlist_id)? {
                false
            } else {
                let date_completed = import
                    .date_override
                    .or_else(|| import.videos.last().and_then(|v| v.published_at));
                tx.execute(
                    "INSERT INTO streams (game_name, tags, stream_count, playlist_id,
                                          first_video_id, game_cover, date_completed)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        import.game_name,
                        serde_json::to_string(&import.tags)?,
                        import.videos.len().max(1) as i64,
                        playlist_id,
                        video_ids.first().copied(),
                        import.game_cover,
                        date_completed,
                    ],
                )?;
                true
            };

            tx.commit()?;

            tracing::info!(
                playlist = %import.playlist_id,
                playlist_id,
                videos = video_ids.len(),
                stream_created,
                "Imported playlist"
            );
            Ok(PlaylistImportResult {
                playlist_id,
                video_ids,
                stream_created,
            })
        })
    }
}

fn stream_exists(conn: &Connection, playlist_id: i64) -> Result<bool, DbError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM streams WHERE playlist_id = ?1)",
        [playlist_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}
