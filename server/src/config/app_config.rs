//! Runtime application configuration loaded from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::bail;

use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

const DATABASE_FILE: &str = "archive.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub server_port: u16,
    /// `None` disables chat upload.
    pub admin_api_key: Option<String>,
    pub ingest_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Configuration with every setting at its default.
    pub fn defaults(data_dir: &Path) -> Self {
        Self {
            database_path: data_dir.join(DATABASE_FILE),
            server_port: 3001,
            admin_api_key: None,
            ingest_timeout: Duration::from_secs(120),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }

    /// Load from process environment variables.
    pub fn from_env(data_dir: &Path) -> Result<Self, anyhow::Error> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Load with `lookup` providing raw values. Unset or blank values fall
    /// back to their defaults; an invalid value fails naming its key.
    pub fn from_lookup(
        data_dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let get = |key: &str| -> Result<String, anyhow::Error> {
            let value = lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| DEFAULT_SETTINGS.get(key).map(|d| d.default.to_string()))
                .unwrap_or_default();
            if let Err(e) = validate_setting(key, &value) {
                bail!("invalid {key}: {e}");
            }
            Ok(value)
        };

        let database_path = match get("DATABASE_PATH")?.as_str() {
            "" => data_dir.join(DATABASE_FILE),
            path => PathBuf::from(path),
        };
        let admin_api_key = Some(get("ADMIN_API_KEY")?).filter(|key| !key.is_empty());

        Ok(Self {
            database_path,
            server_port: get("SERVER_PORT")?.parse()?,
            admin_api_key,
            ingest_timeout: Duration::from_secs(get("INGEST_TIMEOUT_SECS")?.parse()?),
            max_upload_bytes: get("MAX_UPLOAD_BYTES")?.parse()?,
        })
    }
}
