use std::collections::HashMap;
use std::hash::Hash;

use chat_parser::{
    ChatBadge, ChatEmote, ChatEntry, ChatUser, EmotePlacement, EmoteSource,
    NormalizedChatDocument,
};
use rusqlite::{Connection, OptionalExtension};

use super::columns::{decode_badge_ids, decode_emote_refs};
use super::models::{ChatMetadata, StoredEmoteRef};
use crate::{Database, DbError};

/// A `chat_messages` row joined with its user.
struct MessageRow {
    time: u32,
    user_id: i64,
    user: ChatUser,
    message: String,
    badges: Vec<i64>,
    emotes: Vec<StoredEmoteRef>,
}

/// Assigns window-local indices to global ids in first-encounter order.
struct LocalIndex<K> {
    positions: HashMap<K, usize>,
    order: Vec<K>,
}

impl<K: Copy + Eq + Hash> LocalIndex<K> {
    fn new() -> Self {
        Self {
            positions: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Position of `key`, assigning the next one on first sight.
    fn insert(&mut self, key: K) -> usize {
        *self.positions.entry(key).or_insert_with(|| {
            self.order.push(key);
            self.order.len() - 1
        })
    }
}

impl Database {
    /// Chat of `video_id` with message times in `[start, end)`, re-indexed
    /// so that the returned tables hold only what the window references.
    ///
    /// `end = None` is unbounded. Returns `None` when the video has no
    /// archive; an archive with no messages in the window yields an empty
    /// document.
    pub fn get_chat_by_video_id(
        &self,
        video_id: i64,
        start: u32,
        end: Option<u32>,
    ) -> Result<Option<NormalizedChatDocument>, DbError> {
        self.with_conn(|conn| {
            let Some(metadata_id) = metadata_id_for_video(conn, video_id)? else {
                return Ok(None);
            };
            let rows = load_messages(conn, metadata_id, start, end)?;

            let mut badge_index = LocalIndex::new();
            let mut emote_index = LocalIndex::new();
            for row in &rows {
                for &id in &row.badges {
                    badge_index.insert(id);
                }
                for emote in &row.emotes {
                    emote_index.insert(emote.id);
                }
            }
            let badges = load_badges(conn, &badge_index.order)?;
            let emotes = load_emotes(conn, &emote_index.order)?;

            // Ids with no pool row are dropped from the window.
            let mut badge_list = Vec::new();
            let mut badge_positions = HashMap::new();
            for id in &badge_index.order {
                if let Some(badge) = badges.get(id) {
                    badge_positions.insert(*id, badge_list.len());
                    badge_list.push(badge.clone());
                }
            }
            let mut emote_list = Vec::new();
            let mut emote_positions = HashMap::new();
            for id in &emote_index.order {
                if let Some(emote) = emotes.get(id) {
                    emote_positions.insert(*id, emote_list.len());
                    emote_list.push(emote.clone());
                }
            }

            let mut user_index = LocalIndex::new();
            let mut user_list = Vec::new();
            let mut chat_list = Vec::with_capacity(rows.len());
            for row in rows {
                let user = user_index.insert(row.user_id);
                if user == user_list.len() {
                    user_list.push(row.user);
                }
                let entry_badges: Vec<usize> = row
                    .badges
                    .iter()
                    .filter_map(|id| badge_positions.get(id).copied())
                    .collect();
                let entry_emotes: Vec<EmotePlacement> = row
                    .emotes
                    .iter()
                    .filter_map(|emote| {
                        emote_positions
                            .get(&emote.id)
                            .map(|&index| EmotePlacement(index, emote.start, emote.end))
                    })
                    .collect();
                chat_list.push(ChatEntry {
                    time: row.time,
                    user,
                    message: row.message,
                    badges: (!entry_badges.is_empty()).then_some(entry_badges),
                    emotes: (!entry_emotes.is_empty()).then_some(entry_emotes),
                });
            }

            Ok(Some(NormalizedChatDocument {
                badge_list,
                emote_list,
                user_list,
                chat_list,
            }))
        })
    }

    /// Archive summary for `video_id`, with the video's YouTube id.
    pub fn get_chat_metadata(&self, video_id: i64) -> Result<Option<ChatMetadata>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT cm.id, cm.video_id, v.yt_id, cm.twitch_video_id, cm.total_messages,
                        cm.duration, cm.created_at
                 FROM chat_metadata cm
                 JOIN videos v ON v.id = cm.video_id
                 WHERE cm.video_id = ?1",
                [video_id],
                |row| {
                    Ok(ChatMetadata {
                        id: row.get(0)?,
                        video_id: row.get(1)?,
                        youtube_id: row.get(2)?,
                        twitch_video_id: row.get(3)?,
                        total_messages: row.get(4)?,
                        duration: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn has_chat_data(&self, video_id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| Ok(metadata_id_for_video(conn, video_id)?.is_some()))
    }
}

fn metadata_id_for_video(conn: &Connection, video_id: i64) -> Result<Option<i64>, DbError> {
    conn.query_row(
        "SELECT id FROM chat_metadata WHERE video_id = ?1",
        [video_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

fn load_messages(
    conn: &Connection,
    metadata_id: i64,
    start: u32,
    end: Option<u32>,
) -> Result<Vec<MessageRow>, DbError> {
    let mut stmt = conn.prepare_cached(
        "SELECT m.time_seconds, m.user_id, u.name, u.color, m.message, m.badges, m.emotes
         FROM chat_messages m
         JOIN chat_users u ON u.id = m.user_id
         WHERE m.metadata_id = ?1
           AND m.time_seconds >= ?2
           AND (?3 IS NULL OR m.time_seconds < ?3)
         ORDER BY m.time_seconds, m.id",
    )?;
    let raw = stmt.query_map(rusqlite::params![metadata_id, start, end], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, i64>(1)?,
            ChatUser {
                name: row.get(2)?,
                color: row.get(3)?,
            },
            row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut rows = Vec::new();
    for item in raw {
        let (time, user_id, user, message, badges, emotes) = item?;
        rows.push(MessageRow {
            time,
            user_id,
            user,
            message,
            badges: decode_badge_ids(badges.as_deref())?,
            emotes: decode_emote_refs(emotes.as_deref())?,
        });
    }
    Ok(rows)
}

fn load_badges(conn: &Connection, ids: &[i64]) -> Result<HashMap<i64, ChatBadge>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut stmt = conn.prepare_cached(
        "SELECT id, set_version, title, url FROM chat_badges
         WHERE id IN (SELECT value FROM json_each(?1))",
    )?;
    let rows = stmt.query_map([serde_json::to_string(ids)?], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            ChatBadge {
                set_version: row.get(1)?,
                title: row.get(2)?,
                url: row.get(3)?,
            },
        ))
    })?;
    rows.collect::<Result<HashMap<_, _>, _>>().map_err(Into::into)
}

fn load_emotes(conn: &Connection, ids: &[i64]) -> Result<HashMap<i64, ChatEmote>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut stmt = conn.prepare_cached(
        "SELECT id, text, emote_id, source FROM chat_emotes
         WHERE id IN (SELECT value FROM json_each(?1))",
    )?;
    let rows = stmt.query_map([serde_json::to_string(ids)?], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut emotes = HashMap::new();
    for row in rows {
        let (id, text, emote_id, source) = row?;
        let source: EmoteSource = source
            .parse()
            .map_err(|e: String| DbError::InvalidData(format!("chat_emotes row {}: {}", id, e)))?;
        emotes.insert(
            id,
            ChatEmote {
                text,
                id: emote_id,
                source,
            },
        );
    }
    Ok(emotes)
}
