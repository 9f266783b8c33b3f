//! Command-line interface of the import tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Import chat archives and playlists into the VOD archive database.
#[derive(Parser, Debug, Clone)]
#[command(name = "vod-archive-import")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    vod-archive-import chat chat.json dQw4w9WgXcQ
    vod-archive-import chat chat.json twitch:2012345678
    vod-archive-import playlist alien_isolation.json --chat-dir ./alien_isolation_chat/")]
pub struct ImportArgs {
    /// Database file (defaults to DATABASE_PATH or the data directory)
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ImportCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ImportCommand {
    /// Import one chat file, raw export or already normalized
    Chat {
        /// Path to the chat JSON file
        file: PathBuf,
        /// Internal id, YouTube id, or twitch:<vod id>
        video: String,
    },
    /// Import a playlist description and, optionally, its chat files
    Playlist {
        /// Path to the playlist JSON file
        file: PathBuf,
        /// Directory of per-video chat files, paired in numeric filename order
        #[arg(long, value_name = "DIR")]
        chat_dir: Option<PathBuf>,
    },
}
