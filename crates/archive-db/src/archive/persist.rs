use std::time::Instant;

use chat_parser::NormalizedChatDocument;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};

use super::columns::{encode_badge_ids, encode_emote_refs};
use super::models::{SaveResult, StoredEmoteRef};
use super::pools;
use crate::{Database, DbError};

/// Messages per multi-row INSERT.
const MESSAGE_BATCH_SIZE: usize = 500;
const MESSAGE_COLUMNS: usize = 6;

/// Global ids for one document's local indices.
struct IdMaps {
    badges: Vec<i64>,
    emotes: Vec<i64>,
    users: Vec<i64>,
}

impl Database {
    /// Store `document` as the chat archive of `video_id`, replacing any
    /// archive the video already has.
    ///
    /// Runs as one transaction: on any error nothing is changed.
    pub fn save_chat_data(
        &self,
        video_id: i64,
        document: &NormalizedChatDocument,
        twitch_video_id: Option<&str>,
    ) -> Result<SaveResult, DbError> {
        self.save_chat_data_inner(video_id, document, twitch_video_id, None)
    }

    /// Like [`save_chat_data`](Self::save_chat_data), but gives up with
    /// [`DbError::DeadlineExceeded`] once `deadline` has passed. The deadline
    /// is checked between phases and between message batches, and an abort
    /// rolls the whole transaction back.
    pub fn save_chat_data_within(
        &self,
        video_id: i64,
        document: &NormalizedChatDocument,
        twitch_video_id: Option<&str>,
        deadline: Instant,
    ) -> Result<SaveResult, DbError> {
        self.save_chat_data_inner(video_id, document, twitch_video_id, Some(deadline))
    }

    fn save_chat_data_inner(
        &self,
        video_id: i64,
        document: &NormalizedChatDocument,
        twitch_video_id: Option<&str>,
        deadline: Option<Instant>,
    ) -> Result<SaveResult, DbError> {
        document
            .validate()
            .map_err(|e| DbError::InvalidData(e.to_string()))?;
        let twitch_video_id = twitch_video_id.filter(|id| !id.is_empty());

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let video_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM videos WHERE id = ?1)",
                [video_id],
                |row| row.get(0),
            )?;
            if !video_exists {
                return Err(DbError::NotFound(format!("video {}", video_id)));
            }

            let replaced = delete_archive(&tx, video_id)?;
            check_deadline(deadline)?;

            let ids = IdMaps {
                badges: pools::upsert_badges(&tx, &document.badge_list)?,
                emotes: pools::upsert_emotes(&tx, &document.emote_list)?,
                users: pools::upsert_users(&tx, &document.user_list)?,
            };
            check_deadline(deadline)?;

            let metadata_id: i64 = tx.query_row(
                "INSERT INTO chat_metadata (video_id, twitch_video_id, total_messages, duration)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id",
                rusqlite::params![
                    video_id,
                    twitch_video_id,
                    document.chat_list.len() as i64,
                    document.duration()
                ],
                |row| row.get(0),
            )?;

            for (batch_index, batch) in document.chat_list.chunks(MESSAGE_BATCH_SIZE).enumerate() {
                check_deadline(deadline)?;
                insert_message_batch(&tx, metadata_id, batch, &ids)?;
                tracing::debug!(
                    video_id,
                    batch = batch_index,
                    rows = batch.len(),
                    "Inserted chat message batch"
                );
            }

            tx.commit()?;

            tracing::info!(
                video_id,
                metadata_id,
                messages = document.chat_list.len(),
                replaced,
                "Saved chat archive"
            );
            Ok(SaveResult {
                metadata_id,
                message_count: document.chat_list.len(),
            })
        })
    }
}

/// Remove the archive of `video_id`, messages first. Returns whether one
/// existed.
fn delete_archive(conn: &Connection, video_id: i64) -> Result<bool, DbError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM chat_metadata WHERE video_id = ?1",
            [video_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(metadata_id) = existing else {
        return Ok(false);
    };
    conn.execute("DELETE FROM chat_messages WHERE metadata_id = ?1", [metadata_id])?;
    conn.execute("DELETE FROM chat_metadata WHERE id = ?1", [metadata_id])?;
    Ok(true)
}

fn insert_message_batch(
    conn: &Connection,
    metadata_id: i64,
    batch: &[chat_parser::ChatEntry],
    ids: &IdMaps,
) -> Result<(), DbError> {
    let mut values: Vec<Value> = Vec::with_capacity(batch.len() * MESSAGE_COLUMNS);
    for entry in batch {
        let badges: Vec<i64> = entry
            .badges
            .iter()
            .flatten()
            .filter_map(|&index| ids.badges.get(index).copied())
            .collect();
        let emotes: Vec<StoredEmoteRef> = entry
            .emotes
            .iter()
            .flatten()
            .filter_map(|placement| {
                ids.emotes.get(placement.emote()).map(|&id| StoredEmoteRef {
                    id,
                    start: placement.start(),
                    end: placement.end(),
                })
            })
            .collect();
        let user_id = ids.users.get(entry.user).copied().ok_or_else(|| {
            DbError::InvalidData(format!("chat entry references missing user {}", entry.user))
        })?;

        values.push(Value::Integer(metadata_id));
        values.push(Value::Integer(i64::from(entry.time)));
        values.push(Value::Integer(user_id));
        values.push(Value::Text(entry.message.clone()));
        values.push(Value::Text(encode_badge_ids(&badges)?));
        values.push(Value::Text(encode_emote_refs(&emotes)?));
    }

    let row = format!("({})", vec!["?"; MESSAGE_COLUMNS].join(", "));
    let sql = format!(
        "INSERT INTO chat_messages (metadata_id, time_seconds, user_id, message, badges, emotes) VALUES {}",
        vec![row.as_str(); batch.len()].join(", ")
    );
    conn.execute(&sql, rusqlite::params_from_iter(values))?;
    Ok(())
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), DbError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(DbError::DeadlineExceeded),
        _ => Ok(()),
    }
}
