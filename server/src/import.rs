//! Offline import of chat files and playlist descriptions.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use archive_db::catalog::{PlaylistImport, PlaylistImportResult};
use archive_db::{Database, SaveResult, VideoIdentifier};
use chat_parser::DocumentStats;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ChatImportReport {
    pub video_id: i64,
    pub stats: DocumentStats,
    pub saved: SaveResult,
}

/// Outcome for one chat file of a playlist import.
#[derive(Debug, Clone)]
pub struct PlaylistChatReport {
    pub file: PathBuf,
    pub video_id: i64,
    /// `None` when the file held no messages.
    pub saved: Option<SaveResult>,
}

#[derive(Debug, Clone)]
pub struct PlaylistImportReport {
    pub playlist: PlaylistImportResult,
    pub chats: Vec<PlaylistChatReport>,
}

fn read_json(path: &Path) -> Result<Value, anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Import one chat file (raw export or normalized) for the video named by
/// `identifier`. A `twitch:<id>` identifier is also recorded as the
/// archive's Twitch VOD id.
pub fn import_chat_file(
    db: &Database,
    path: &Path,
    identifier: &VideoIdentifier,
) -> Result<ChatImportReport, anyhow::Error> {
    let Some(video_id) = db.resolve_video_id(identifier)? else {
        bail!("no video found for {identifier}; make sure the video exists in the database first");
    };

    let document = chat_parser::parse(read_json(path)?)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let stats = document.stats();
    if document.is_empty() {
        bail!("{} contains no chat messages", path.display());
    }

    let saved = db.save_chat_data(video_id, &document, identifier.twitch_id())?;
    tracing::info!(
        video_id,
        messages = saved.message_count,
        badges = stats.badges,
        emotes = stats.emotes,
        users = stats.users,
        "Imported chat file"
    );
    Ok(ChatImportReport {
        video_id,
        stats,
        saved,
    })
}

/// Import a playlist description, then pair `*.json` files of `chat_dir`
/// (numeric filename order) with the playlist's videos in order.
pub fn import_playlist_file(
    db: &Database,
    path: &Path,
    chat_dir: Option<&Path>,
) -> Result<PlaylistImportReport, anyhow::Error> {
    let import: PlaylistImport = serde_json::from_value(read_json(path)?)
        .with_context(|| format!("{} is not a playlist description", path.display()))?;
    let playlist = db.import_playlist(&import)?;

    let mut chats = Vec::new();
    if let Some(dir) = chat_dir {
        let files = chat_files(dir)?;
        if files.len() > playlist.video_ids.len() {
            tracing::warn!(
                files = files.len(),
                videos = playlist.video_ids.len(),
                "More chat files than playlist videos, extra files are ignored"
            );
        }
        for (file, &video_id) in files.into_iter().zip(&playlist.video_ids) {
            let document = chat_parser::parse(read_json(&file)?)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            let saved = if document.is_empty() {
                tracing::info!(file = %file.display(), "Chat file has no messages");
                None
            } else {
                Some(db.save_chat_data(video_id, &document, None)?)
            };
            chats.push(PlaylistChatReport {
                file,
                video_id,
                saved,
            });
        }
    }

    Ok(PlaylistImportReport { playlist, chats })
}

/// `*.json` files ordered by their leading number (`2.json` before
/// `10.json`); files without one sort last by name.
fn chat_files(dir: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read chat directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
        (digits.parse::<u64>().unwrap_or(u64::MAX), name)
    });
    Ok(files)
}
