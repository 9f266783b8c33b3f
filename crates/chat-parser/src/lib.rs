//! Twitch chat archive normalization.
//!
//! Turns a raw chat export (an array of chat events) into a
//! [`NormalizedChatDocument`]: deduplicated badge, emote and user tables plus
//! a time-ordered message list that refers to them by index. Documents that
//! are already normalized are passed through, minus records that cannot be
//! resolved.

pub mod document;
pub mod raw;

mod parse;

use serde_json::{Map, Value};

pub use document::{
    ChatBadge, ChatEmote, ChatEntry, ChatUser, DocumentStats, EmotePlacement, EmoteSource,
    NormalizedChatDocument, ResolvedEntry,
};
pub use parse::parse_raw_chat_log;

/// Errors raised for structurally invalid input, and by
/// [`NormalizedChatDocument::validate`].
///
/// Individual malformed chat records never make [`parse`] fail; they are
/// defaulted or dropped.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("chat data must be a JSON object or array, got {0}")]
    InvalidTopLevel(&'static str),

    #[error("chat entry {entry} references missing {kind} index {index}")]
    DanglingReference {
        entry: usize,
        kind: &'static str,
        index: usize,
    },

    #[error("chat entry {entry} has an emote range {start}-{end} that ends before it starts")]
    InvalidEmoteRange { entry: usize, start: u32, end: u32 },
}

/// The two accepted chat payload shapes, detected once at the boundary.
#[derive(Debug, Clone)]
pub enum ChatInput {
    /// Raw export events, not yet normalized.
    Raw(Vec<Value>),
    /// A document already in normalized form.
    Normalized(NormalizedChatDocument),
}

impl ChatInput {
    /// Classify a JSON payload.
    ///
    /// Objects carrying all four normalized tables are decoded record by
    /// record. Any other object is treated as a raw export without events.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(object) if has_normalized_tables(&object) => {
                Ok(Self::Normalized(parse::parse_normalized(&object)))
            }
            Value::Array(events) => Ok(Self::Raw(events)),
            Value::Object(_) => Ok(Self::Raw(Vec::new())),
            other => Err(ParseError::InvalidTopLevel(json_kind(&other))),
        }
    }

    pub fn into_document(self) -> NormalizedChatDocument {
        match self {
            Self::Raw(events) => parse_raw_chat_log(&events),
            Self::Normalized(document) => document,
        }
    }
}

/// Whether `value` already has the normalized `badgeList`/`emoteList`/
/// `userList`/`chatList` arrays.
pub fn is_already_parsed(value: &Value) -> bool {
    value.as_object().is_some_and(has_normalized_tables)
}

fn has_normalized_tables(object: &Map<String, Value>) -> bool {
    ["badgeList", "emoteList", "userList", "chatList"]
        .iter()
        .all(|key| object.get(*key).is_some_and(Value::is_array))
}

/// Normalize a raw export, or pass a normalized document through.
pub fn parse(value: Value) -> Result<NormalizedChatDocument, ParseError> {
    Ok(ChatInput::from_value(value)?.into_document())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
