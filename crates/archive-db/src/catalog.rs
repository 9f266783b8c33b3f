//! Video, playlist and stream catalog, and resolution of external video
//! identifiers to internal ids.

mod identity;
mod models;
mod playlists;
mod videos;

pub use identity::VideoIdentifier;
pub use models::{
    NewVideo, PlaylistDetails, PlaylistImport, PlaylistImportResult, PlaylistVideo,
    StreamSummary, Video, VideoDetails,
};
