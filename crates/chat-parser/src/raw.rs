//! Raw Twitch chat export events, and loosely typed entries of documents
//! that arrive already normalized.
//!
//! Every field is optional and decoded leniently: a field of the wrong JSON
//! type reads as absent instead of failing the event, and list elements that
//! cannot be decoded are dropped individually.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const TEXT_MESSAGE: &str = "text_message";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChatEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub message_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub time_in_seconds: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<RawAuthor>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub emotes: Vec<RawEmote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, alias = "color", deserialize_with = "lenient")]
    pub colour: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub badges: Vec<RawBadge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBadge {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub icons: Vec<RawImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmote {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<RawImage>,
    /// `"start-end"`, several comma separated ranges, or a list of ranges.
    #[serde(default)]
    pub locations: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// A `chatList` entry of a normalized payload, before its indices are
/// checked against the tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LooseChatEntry {
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub time: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<usize>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub badges: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub emotes: Option<Vec<Value>>,
}

impl LooseChatEntry {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }
}

impl RawChatEvent {
    /// Decode one export element. Only non-objects fail.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }

    pub fn is_text_message(&self) -> bool {
        self.message_type.as_deref() == Some(TEXT_MESSAGE)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Numbers, or strings holding a finite number.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// Strings as-is, numbers in their JSON text form (badge versions and emote
/// ids appear as either).
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
