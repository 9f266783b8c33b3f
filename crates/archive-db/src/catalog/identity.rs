use std::fmt;

use rusqlite::{Connection, OptionalExtension};

use crate::{Database, DbError};

const TWITCH_PREFIX: &str = "twitch:";

/// A caller-supplied video reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoIdentifier {
    /// Internal `videos.id`.
    Internal(i64),
    YouTube(String),
    /// Twitch VOD id, written `twitch:<id>`.
    Twitch(String),
}

impl VideoIdentifier {
    /// Classify `text`: `twitch:<id>` is a Twitch VOD, all digits is an
    /// internal id, anything else a YouTube id. Blank input is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(twitch_id) = text.strip_prefix(TWITCH_PREFIX) {
            let twitch_id = twitch_id.trim();
            return (!twitch_id.is_empty()).then(|| Self::Twitch(twitch_id.to_string()));
        }
        if text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = text.parse::<i64>() {
                return Some(Self::Internal(id));
            }
        }
        Some(Self::YouTube(text.to_string()))
    }

    pub fn twitch_id(&self) -> Option<&str> {
        match self {
            Self::Twitch(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for VideoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(id) => write!(f, "{}", id),
            Self::YouTube(id) => f.write_str(id),
            Self::Twitch(id) => write!(f, "{}{}", TWITCH_PREFIX, id),
        }
    }
}

impl Database {
    /// Internal id for `identifier`, or `None` when no video matches.
    ///
    /// An internal id that does not exist is retried as a YouTube id, since
    /// nothing prevents a YouTube id from being all digits.
    pub fn resolve_video_id(&self, identifier: &VideoIdentifier) -> Result<Option<i64>, DbError> {
        self.with_conn(|conn| match identifier {
            VideoIdentifier::Internal(id) => {
                if video_exists(conn, *id)? {
                    return Ok(Some(*id));
                }
                lookup_id(conn, "SELECT id FROM videos WHERE yt_id = ?1", &id.to_string())
            }
            VideoIdentifier::YouTube(youtube_id) => {
                lookup_id(conn, "SELECT id FROM videos WHERE yt_id = ?1", youtube_id)
            }
            VideoIdentifier::Twitch(twitch_id) => {
                lookup_id(conn, "SELECT id FROM videos WHERE twitch_id = ?1", twitch_id)
            }
        })
    }

    pub fn video_id_by_youtube_id(&self, youtube_id: &str) -> Result<Option<i64>, DbError> {
        self.with_conn(|conn| lookup_id(conn, "SELECT id FROM videos WHERE yt_id = ?1", youtube_id))
    }

    pub fn video_id_by_twitch_id(&self, twitch_id: &str) -> Result<Option<i64>, DbError> {
        self.with_conn(|conn| {
            lookup_id(conn, "SELECT id FROM videos WHERE twitch_id = ?1", twitch_id)
        })
    }

    pub fn youtube_id_for_video(&self, video_id: i64) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT yt_id FROM videos WHERE id = ?1", [video_id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
        })
    }

    /// Internal playlist id from an internal id or a YouTube playlist id.
    pub fn resolve_playlist_id(&self, identifier: &str) -> Result<Option<i64>, DbError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(None);
        }
        self.with_conn(|conn| {
            if let Ok(id) = identifier.parse::<i64>() {
                let found: Option<i64> = conn
                    .query_row("SELECT id FROM playlists WHERE id = ?1", [id], |row| row.get(0))
                    .optional()?;
                if found.is_some() {
                    return Ok(found);
                }
            }
            lookup_id(conn, "SELECT id FROM playlists WHERE youtube_id = ?1", identifier)
        })
    }
}

pub(super) fn video_exists(conn: &Connection, video_id: i64) -> Result<bool, DbError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM videos WHERE id = ?1)",
        [video_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

fn lookup_id(conn: &Connection, sql: &str, key: &str) -> Result<Option<i64>, DbError> {
    conn.query_row(sql, [key], |row| row.get(0))
        .optional()
        .map_err(Into::into)
}
