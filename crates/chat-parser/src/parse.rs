use std::collections::HashMap;
use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::document::{
    ChatBadge, ChatEmote, ChatEntry, ChatUser, EmotePlacement, EmoteSource,
    NormalizedChatDocument,
};
use crate::raw::{LooseChatEntry, RawAuthor, RawBadge, RawChatEvent, RawEmote};

const DEFAULT_USER_NAME: &str = "Unknown";
const DEFAULT_USER_COLOR: &str = "#FFFFFF";
const PREFERRED_BADGE_ICON: &str = "18x18";

static RE_BADGE_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"badges/v1/([a-f0-9-]+)").expect("badge url pattern is valid")
});

/// Deduplicating table: hands out one index per distinct key, in first
/// insertion order.
struct Interner<K, V> {
    index: HashMap<K, usize>,
    items: Vec<V>,
}

impl<K: Eq + Hash, V> Default for Interner<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<K: Eq + Hash, V> Interner<K, V> {
    fn get(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn intern(&mut self, key: K, make: impl FnOnce() -> V) -> usize {
        *self.index.entry(key).or_insert_with(|| {
            self.items.push(make());
            self.items.len() - 1
        })
    }

    fn into_items(self) -> Vec<V> {
        self.items
    }
}

#[derive(Default)]
struct Tables {
    badges: Interner<String, ChatBadge>,
    emotes: Interner<(String, String, EmoteSource), ChatEmote>,
    users: Interner<(String, String), ChatUser>,
}

/// Normalize raw export events.
///
/// Only `text_message` events are kept. Users, badges and emotes are
/// deduplicated by natural key, and the resulting messages are stably sorted
/// by time.
pub fn parse_raw_chat_log(events: &[Value]) -> NormalizedChatDocument {
    let mut tables = Tables::default();
    let mut chat_list = Vec::new();
    let mut ignored = 0usize;

    for value in events {
        let Some(event) = RawChatEvent::from_value(value) else {
            ignored += 1;
            continue;
        };
        if !event.is_text_message() {
            ignored += 1;
            continue;
        }
        chat_list.push(tables.build_entry(event));
    }

    chat_list.sort_by_key(|entry| entry.time);

    tracing::debug!(
        messages = chat_list.len(),
        ignored,
        badges = tables.badges.items.len(),
        emotes = tables.emotes.items.len(),
        users = tables.users.items.len(),
        "Parsed raw chat export"
    );

    NormalizedChatDocument {
        badge_list: tables.badges.into_items(),
        emote_list: tables.emotes.into_items(),
        user_list: tables.users.into_items(),
        chat_list,
    }
}

/// Old table position to new position, `None` for rows that were dropped.
type Remap = Vec<Option<usize>>;

fn decode_table<T: DeserializeOwned>(value: Option<&Value>) -> (Vec<T>, Remap) {
    let mut rows = Vec::new();
    let mut remap = Vec::new();
    for item in value.and_then(Value::as_array).into_iter().flatten() {
        match T::deserialize(item) {
            Ok(row) => {
                remap.push(Some(rows.len()));
                rows.push(row);
            }
            Err(_) => remap.push(None),
        }
    }
    (rows, remap)
}

fn remapped(remap: &Remap, index: usize) -> Option<usize> {
    remap.get(index).copied().flatten()
}

/// Rebuild a document that arrived already normalized, keeping its entry
/// order.
///
/// Table rows that do not decode are dropped and the remaining rows
/// renumbered. An entry whose user cannot be resolved is dropped; dangling
/// badge or emote references and reversed ranges are removed from the entry
/// that carries them. A missing message reads as empty.
pub(crate) fn parse_normalized(object: &Map<String, Value>) -> NormalizedChatDocument {
    let (badge_list, badges) = decode_table::<ChatBadge>(object.get("badgeList"));
    let (emote_list, emotes) = decode_table::<ChatEmote>(object.get("emoteList"));
    let (user_list, users) = decode_table::<ChatUser>(object.get("userList"));

    let mut chat_list = Vec::new();
    let mut dropped = 0usize;
    for value in object.get("chatList").and_then(Value::as_array).into_iter().flatten() {
        let Some(entry) = LooseChatEntry::from_value(value) else {
            dropped += 1;
            continue;
        };
        let Some(user) = entry.user.and_then(|index| remapped(&users, index)) else {
            dropped += 1;
            continue;
        };

        let entry_badges: Vec<usize> = entry
            .badges
            .iter()
            .flatten()
            .filter_map(|index| usize::deserialize(index).ok())
            .filter_map(|index| remapped(&badges, index))
            .collect();
        let entry_emotes: Vec<EmotePlacement> = entry
            .emotes
            .iter()
            .flatten()
            .filter_map(|placement| EmotePlacement::deserialize(placement).ok())
            .filter(|placement| placement.start() <= placement.end())
            .filter_map(|placement| {
                remapped(&emotes, placement.emote())
                    .map(|index| EmotePlacement(index, placement.start(), placement.end()))
            })
            .collect();

        chat_list.push(ChatEntry {
            time: whole_seconds(entry.time),
            user,
            message: entry.message.unwrap_or_default(),
            badges: (!entry_badges.is_empty()).then_some(entry_badges),
            emotes: (!entry_emotes.is_empty()).then_some(entry_emotes),
        });
    }

    if dropped > 0 {
        tracing::debug!(dropped, kept = chat_list.len(), "Dropped unusable normalized chat entries");
    }

    NormalizedChatDocument {
        badge_list,
        emote_list,
        user_list,
        chat_list,
    }
}

impl Tables {
    fn build_entry(&mut self, event: RawChatEvent) -> ChatEntry {
        let author = event.author.unwrap_or_default();
        let user = self.user_index(&author);

        let badges: Vec<usize> = author
            .badges
            .iter()
            .filter_map(|badge| self.badge_index(badge))
            .collect();

        let mut emotes = Vec::new();
        for emote in &event.emotes {
            let index = self.emote_index(emote);
            match &emote.locations {
                Some(locations) => emotes.extend(
                    parse_locations(locations)
                        .into_iter()
                        .map(|(start, end)| EmotePlacement(index, start, end)),
                ),
                None => tracing::debug!(emote = ?emote.name, "Emote without locations"),
            }
        }

        ChatEntry {
            time: whole_seconds(event.time_in_seconds),
            user,
            message: event.message.unwrap_or_default(),
            badges: (!badges.is_empty()).then_some(badges),
            emotes: (!emotes.is_empty()).then_some(emotes),
        }
    }

    fn user_index(&mut self, author: &RawAuthor) -> usize {
        let name = non_empty(&author.display_name)
            .or_else(|| non_empty(&author.name))
            .unwrap_or(DEFAULT_USER_NAME)
            .to_string();
        let color = non_empty(&author.colour)
            .unwrap_or(DEFAULT_USER_COLOR)
            .to_string();
        self.users.intern((name.clone(), color.clone()), || ChatUser { name, color })
    }

    fn badge_index(&mut self, badge: &RawBadge) -> Option<usize> {
        let name = badge.name.clone().unwrap_or_default();
        let set_version = format!("{}:{}", name, badge.version.as_deref().unwrap_or_default());
        if let Some(index) = self.badges.get(&set_version) {
            return Some(index);
        }
        let Some(url) = extract_badge_url(badge) else {
            tracing::debug!(%set_version, "Skipping badge without a recognizable icon url");
            return None;
        };
        let title = non_empty(&badge.title).map(str::to_string).unwrap_or(name);
        Some(self.badges.intern(set_version.clone(), || ChatBadge {
            set_version,
            title,
            url,
        }))
    }

    fn emote_index(&mut self, emote: &RawEmote) -> usize {
        let text = emote.name.clone().unwrap_or_default();
        let id = emote.id.clone().unwrap_or_default();
        let source = detect_emote_source(emote);
        self.emotes
            .intern((text.clone(), id.clone(), source), || ChatEmote { text, id, source })
    }
}

/// CDN fragment of a badge's icon, preferring the 18x18 rendition.
pub(crate) fn extract_badge_url(badge: &RawBadge) -> Option<String> {
    let icon = badge
        .icons
        .iter()
        .find(|icon| icon.id.as_deref() == Some(PREFERRED_BADGE_ICON))
        .or_else(|| badge.icons.first())?;
    let url = icon.url.as_deref()?;
    RE_BADGE_FRAGMENT
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|fragment| fragment.as_str().to_string())
}

/// Third-party providers are recognized by their image host; everything
/// else is a native Twitch emote.
pub(crate) fn detect_emote_source(emote: &RawEmote) -> EmoteSource {
    let url = emote
        .images
        .first()
        .and_then(|image| image.url.as_deref())
        .unwrap_or_default();
    if url.contains("betterttv") {
        EmoteSource::BetterTtvChannel
    } else if url.contains("frankerfacez") {
        EmoteSource::FrankerFaceZChannel
    } else if url.contains("7tv") {
        EmoteSource::SevenTvChannel
    } else {
        EmoteSource::Twitch
    }
}

/// Parse emote ranges. Unparseable or reversed ranges are dropped.
pub(crate) fn parse_locations(locations: &Value) -> Vec<(u32, u32)> {
    match locations {
        Value::String(text) => text.split(',').filter_map(parse_range).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(parse_range)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    let (start, end) = range.trim().split_once('-')?;
    let start = start.trim().parse::<u32>().ok()?;
    let end = end.trim().parse::<u32>().ok()?;
    (start <= end).then_some((start, end))
}

/// Floor to whole seconds. Negative offsets (messages sent before the
/// recording started) clamp to zero.
fn whole_seconds(time: Option<f64>) -> u32 {
    let seconds = time.unwrap_or(0.0).floor();
    if seconds.is_nan() || seconds <= 0.0 {
        0
    } else if seconds >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        seconds as u32
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
