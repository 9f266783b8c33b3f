pub mod app;
pub mod cli;
pub mod config;
pub mod import;
pub mod server;

use std::path::PathBuf;

use archive_db::Database;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Data directory: `VOD_ARCHIVE_DATA_DIR`, else `~/.vod-archive`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VOD_ARCHIVE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vod-archive")
}

pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// `RUST_LOG` filtering, `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load configuration and open the archive database.
pub fn init_foundation() -> Result<(Database, AppConfig), anyhow::Error> {
    load_dotenv();
    let config = AppConfig::from_env(&data_dir())?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!("Opening database at {}", config.database_path.display());
    let db = Database::open(&config.database_path)?;

    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set, chat upload is disabled");
    }
    tracing::info!("Settings loaded (port={})", config.server_port);
    Ok((db, config))
}
