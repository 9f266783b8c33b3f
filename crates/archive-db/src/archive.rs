//! Chat archives: persistence of normalized documents and windowed
//! retrieval.
//!
//! Badges, emotes and users live in global pools shared by every archive and
//! are addressed by natural key. Messages reference pool rows by global id;
//! documents going in and out of this module use per-document indices.

mod columns;
mod models;
mod persist;
mod pools;
mod retrieve;

pub use models::{ChatMetadata, SaveResult, StoredEmoteRef};
