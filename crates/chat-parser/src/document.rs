//! Normalized chat document model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// A self-contained chat transcript.
///
/// Every index in `chat_list` points into the tables of the same document;
/// indices are not stable across documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedChatDocument {
    pub badge_list: Vec<ChatBadge>,
    pub emote_list: Vec<ChatEmote>,
    pub user_list: Vec<ChatUser>,
    pub chat_list: Vec<ChatEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBadge {
    /// Natural key, `"<name>:<version>"`.
    pub set_version: String,
    pub title: String,
    /// CDN path fragment of the badge image.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatEmote {
    pub text: String,
    pub id: String,
    pub source: EmoteSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatUser {
    pub name: String,
    pub color: String,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Video-relative time in whole seconds.
    pub time: u32,
    /// Index into `user_list`.
    pub user: usize,
    pub message: String,
    /// Indices into `badge_list`. Absent rather than empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<usize>>,
    /// Emote occurrences. Absent rather than empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotes: Option<Vec<EmotePlacement>>,
}

/// `[emoteIndex, start, end]`: an emote occurrence covering the inclusive
/// code point range `start..=end` of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmotePlacement(pub usize, pub u32, pub u32);

impl EmotePlacement {
    pub fn emote(&self) -> usize {
        self.0
    }

    pub fn start(&self) -> u32 {
        self.1
    }

    pub fn end(&self) -> u32 {
        self.2
    }
}

/// Where an emote comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmoteSource {
    #[serde(rename = "Twitch")]
    Twitch,
    #[serde(rename = "BetterTTV Global")]
    BetterTtvGlobal,
    #[serde(rename = "BetterTTV Channel")]
    BetterTtvChannel,
    #[serde(rename = "FrankerFaceZ Global")]
    FrankerFaceZGlobal,
    #[serde(rename = "FrankerFaceZ Channel")]
    FrankerFaceZChannel,
    #[serde(rename = "7TV Global")]
    SevenTvGlobal,
    #[serde(rename = "7TV Channel")]
    SevenTvChannel,
}

impl EmoteSource {
    pub const ALL: [EmoteSource; 7] = [
        Self::Twitch,
        Self::BetterTtvGlobal,
        Self::BetterTtvChannel,
        Self::FrankerFaceZGlobal,
        Self::FrankerFaceZChannel,
        Self::SevenTvGlobal,
        Self::SevenTvChannel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Twitch => "Twitch",
            Self::BetterTtvGlobal => "BetterTTV Global",
            Self::BetterTtvChannel => "BetterTTV Channel",
            Self::FrankerFaceZGlobal => "FrankerFaceZ Global",
            Self::FrankerFaceZChannel => "FrankerFaceZ Channel",
            Self::SevenTvGlobal => "7TV Global",
            Self::SevenTvChannel => "7TV Channel",
        }
    }
}

impl fmt::Display for EmoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmoteSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown emote source: {s}"))
    }
}

/// Table sizes of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub badges: usize,
    pub emotes: usize,
    pub users: usize,
    pub messages: usize,
}

/// A chat entry with its indices resolved against the owning document.
///
/// Two documents describe the same transcript when their resolved entries
/// are equal, whatever their index numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry<'a> {
    pub time: u32,
    pub user: &'a ChatUser,
    pub message: &'a str,
    pub badges: Vec<&'a ChatBadge>,
    pub emotes: Vec<(&'a ChatEmote, u32, u32)>,
}

impl NormalizedChatDocument {
    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            badges: self.badge_list.len(),
            emotes: self.emote_list.len(),
            users: self.user_list.len(),
            messages: self.chat_list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chat_list.is_empty()
    }

    /// Latest message time, 0 for an empty document.
    pub fn duration(&self) -> u32 {
        self.chat_list.iter().map(|entry| entry.time).max().unwrap_or(0)
    }

    pub fn is_time_sorted(&self) -> bool {
        self.chat_list.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }

    /// Check that every index refers to an existing table row and every
    /// emote range is ordered.
    pub fn validate(&self) -> Result<(), ParseError> {
        for (entry_index, entry) in self.chat_list.iter().enumerate() {
            if entry.user >= self.user_list.len() {
                return Err(ParseError::DanglingReference {
                    entry: entry_index,
                    kind: "user",
                    index: entry.user,
                });
            }
            for &badge in entry.badges.iter().flatten() {
                if badge >= self.badge_list.len() {
                    return Err(ParseError::DanglingReference {
                        entry: entry_index,
                        kind: "badge",
                        index: badge,
                    });
                }
            }
            for placement in entry.emotes.iter().flatten() {
                if placement.emote() >= self.emote_list.len() {
                    return Err(ParseError::DanglingReference {
                        entry: entry_index,
                        kind: "emote",
                        index: placement.emote(),
                    });
                }
                if placement.start() > placement.end() {
                    return Err(ParseError::InvalidEmoteRange {
                        entry: entry_index,
                        start: placement.start(),
                        end: placement.end(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve every entry's indices. Dangling indices are skipped, so call
    /// [`validate`](Self::validate) first when that matters.
    pub fn resolve_entries(&self) -> Vec<ResolvedEntry<'_>> {
        self.chat_list
            .iter()
            .filter_map(|entry| {
                let user = self.user_list.get(entry.user)?;
                Some(ResolvedEntry {
                    time: entry.time,
                    user,
                    message: &entry.message,
                    badges: entry
                        .badges
                        .iter()
                        .flatten()
                        .filter_map(|&index| self.badge_list.get(index))
                        .collect(),
                    emotes: entry
                        .emotes
                        .iter()
                        .flatten()
                        .filter_map(|placement| {
                            self.emote_list
                                .get(placement.emote())
                                .map(|emote| (emote, placement.start(), placement.end()))
                        })
                        .collect(),
                })
            })
            .collect()
    }

    /// Group entries into fixed-width time buckets keyed by bucket number
    /// (`time / chunk_seconds`). A zero width is treated as one second.
    pub fn split_by_time(&self, chunk_seconds: u32) -> BTreeMap<u32, Vec<&ChatEntry>> {
        let width = chunk_seconds.max(1);
        let mut chunks: BTreeMap<u32, Vec<&ChatEntry>> = BTreeMap::new();
        for entry in &self.chat_list {
            chunks.entry(entry.time / width).or_default().push(entry);
        }
        chunks
    }
}
