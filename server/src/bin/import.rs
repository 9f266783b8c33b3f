//! Offline importer for chat files and playlist descriptions.

use anyhow::Context;
use archive_db::{Database, VideoIdentifier};
use clap::Parser;

use vod_archive_lib::cli::{ImportArgs, ImportCommand};
use vod_archive_lib::config::AppConfig;
use vod_archive_lib::import;

fn main() -> anyhow::Result<()> {
    vod_archive_lib::init_tracing();
    vod_archive_lib::load_dotenv();
    let args = ImportArgs::parse();

    let database_path = match args.database {
        Some(path) => path,
        None => AppConfig::from_env(&vod_archive_lib::data_dir())?.database_path,
    };
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&database_path)
        .with_context(|| format!("failed to open {}", database_path.display()))?;

    match args.command {
        ImportCommand::Chat { file, video } => {
            let identifier = VideoIdentifier::parse(&video)
                .with_context(|| format!("invalid video identifier {video:?}"))?;
            let report = import::import_chat_file(&db, &file, &identifier)?;
            println!("Video ID resolved to: {}", report.video_id);
            println!("Found {} messages", report.stats.messages);
            println!("Found {} unique badges", report.stats.badges);
            println!("Found {} unique emotes", report.stats.emotes);
            println!("Found {} unique users", report.stats.users);
            println!(
                "Saved {} messages (metadata id {})",
                report.saved.message_count, report.saved.metadata_id
            );
        }
        ImportCommand::Playlist { file, chat_dir } => {
            let report = import::import_playlist_file(&db, &file, chat_dir.as_deref())?;
            println!("Playlist DB ID: {}", report.playlist.playlist_id);
            for (order, video_id) in report.playlist.video_ids.iter().enumerate() {
                println!("  Video {order} -> ID {video_id}");
            }
            if report.playlist.stream_created {
                println!("  Created stream entry");
            } else {
                println!("  Stream entry already exists");
            }
            for (order, chat) in report.chats.iter().enumerate() {
                match &chat.saved {
                    Some(saved) => println!("  Chat {order}: {} messages saved", saved.message_count),
                    None => println!("  Chat {order}: No messages"),
                }
            }
        }
    }
    Ok(())
}
