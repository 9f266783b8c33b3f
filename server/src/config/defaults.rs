//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, &'static str);

const DEFS: &[DefTuple] = &[
    (
        "DATABASE_PATH",
        "",
        false,
        "SQLite database file; empty means archive.db in the data directory",
    ),
    ("SERVER_PORT", "3001", false, "HTTP listen port"),
    (
        "ADMIN_API_KEY",
        "",
        true,
        "Key required in the x-api-key header of upload requests; empty disables uploads",
    ),
    (
        "INGEST_TIMEOUT_SECS",
        "120",
        false,
        "Deadline for storing one uploaded chat archive",
    ),
    (
        "MAX_UPLOAD_BYTES",
        "67108864",
        false,
        "Largest accepted upload request body",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    /// Never logged.
    pub secret: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
