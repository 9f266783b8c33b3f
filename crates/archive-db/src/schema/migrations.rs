use rusqlite::Connection;

use crate::DbError;

/// Bring databases created before the catalog gained Twitch and playlist
/// columns up to the current table layout.
pub(super) fn migrate_legacy_tables(conn: &Connection) -> Result<(), DbError> {
    migrate_videos_twitch_id(conn)?;
    migrate_videos_playlist_columns(conn)?;
    migrate_videos_duration(conn)?;
    migrate_chat_metadata_twitch_video_id(conn)?;
    Ok(())
}

fn migrate_videos_twitch_id(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "videos", "twitch_id")? {
        return Ok(());
    }
    tracing::info!("Adding twitch_id column to videos");
    conn.execute_batch("ALTER TABLE videos ADD COLUMN twitch_id TEXT;")?;
    Ok(())
}

/// Playlist membership used to live only on `streams.first_video_id`.
/// Backfill it for those first videos.
fn migrate_videos_playlist_columns(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "videos", "playlist_id")? {
        return Ok(());
    }
    tracing::info!("Adding playlist_id/playlist_order columns to videos");
    conn.execute_batch(
        "ALTER TABLE videos ADD COLUMN playlist_id INTEGER REFERENCES playlists(id) ON DELETE SET NULL;
         ALTER TABLE videos ADD COLUMN playlist_order INTEGER;
         UPDATE videos
         SET playlist_id = (
             SELECT s.playlist_id FROM streams s
             WHERE s.first_video_id = videos.id
             ORDER BY s.id
             LIMIT 1
         ),
             playlist_order = 0
         WHERE EXISTS (SELECT 1 FROM streams s WHERE s.first_video_id = videos.id);",
    )?;
    Ok(())
}

fn migrate_videos_duration(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "videos", "duration")? {
        return Ok(());
    }
    tracing::info!("Adding duration column to videos");
    conn.execute_batch("ALTER TABLE videos ADD COLUMN duration TEXT;")?;
    Ok(())
}

fn migrate_chat_metadata_twitch_video_id(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "chat_metadata", "twitch_video_id")? {
        return Ok(());
    }
    tracing::info!("Adding twitch_video_id column to chat_metadata");
    conn.execute_batch("ALTER TABLE chat_metadata ADD COLUMN twitch_video_id TEXT;")?;
    Ok(())
}

pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}
