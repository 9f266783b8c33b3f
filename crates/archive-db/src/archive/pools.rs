//! Insert-or-get against the global badge, emote and user pools.
//!
//! Each upsert is a single statement keyed by the pool's unique constraint,
//! so concurrent ingests that share a row never create duplicates.

use chat_parser::{ChatBadge, ChatEmote, ChatUser};
use rusqlite::Connection;

use crate::DbError;

/// Map each badge to its global id, in `badges` order. An existing badge
/// keeps its url but takes the newer title.
pub(super) fn upsert_badges(conn: &Connection, badges: &[ChatBadge]) -> Result<Vec<i64>, DbError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO chat_badges (set_version, title, url) VALUES (?1, ?2, ?3)
         ON CONFLICT(set_version) DO UPDATE SET title = excluded.title
         RETURNING id",
    )?;
    badges
        .iter()
        .map(|badge| {
            stmt.query_row(
                rusqlite::params![badge.set_version, badge.title, badge.url],
                |row| row.get(0),
            )
            .map_err(Into::into)
        })
        .collect()
}

pub(super) fn upsert_emotes(conn: &Connection, emotes: &[ChatEmote]) -> Result<Vec<i64>, DbError> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    let mut stmt = conn.prepare_cached(
        "INSERT INTO chat_emotes (text, emote_id, source) VALUES (?1, ?2, ?3)
         ON CONFLICT(text, emote_id, source) DO UPDATE SET text = excluded.text
         RETURNING id",
    )?;
    emotes
        .iter()
        .map(|emote| {
            stmt.query_row(
                rusqlite::params![emote.text, emote.id, emote.source.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into)
        })
        .collect()
}

pub(super) fn upsert_users(conn: &Connection, users: &[ChatUser]) -> Result<Vec<i64>, DbError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO chat_users (name, color) VALUES (?1, ?2)
         ON CONFLICT(name, color) DO UPDATE SET name = excluded.name
         RETURNING id",
    )?;
    users
        .iter()
        .map(|user| {
            stmt.query_row(rusqlite::params![user.name, user.color], |row| row.get(0))
                .map_err(Into::into)
        })
        .collect()
}
