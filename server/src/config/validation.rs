//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_API_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._~+/=-]{16,256}$").unwrap());

const MIN_UPLOAD_BYTES: u64 = 1024;
const MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "INGEST_TIMEOUT_SECS" => validate_int_range(value, 1, 3600)?,
        "MAX_UPLOAD_BYTES" => {
            let v: u64 = value.parse().map_err(|_| "must be an integer")?;
            if !(MIN_UPLOAD_BYTES..=MAX_UPLOAD_BYTES).contains(&v) {
                return Err(format!(
                    "must be between {MIN_UPLOAD_BYTES} and {MAX_UPLOAD_BYTES}"
                ));
            }
        }
        "ADMIN_API_KEY" => {
            if !value.is_empty() && !RE_API_KEY.is_match(value) {
                return Err("must be 16-256 characters without whitespace".into());
            }
        }
        "DATABASE_PATH" => {
            if value.chars().any(char::is_control) {
                return Err("must not contain control characters".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
