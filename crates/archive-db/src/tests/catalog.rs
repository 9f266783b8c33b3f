use chrono::{TimeZone, Utc};

use super::{add_video, count_rows, test_db};
use crate::catalog::{NewVideo, PlaylistImport, PlaylistVideo};
use crate::{DbError, VideoIdentifier};

fn playlist_import(playlist_id: &str, video_ids: &[&str]) -> PlaylistImport {
    PlaylistImport {
        playlist_id: playlist_id.into(),
        game_name: "Alien: Isolation".into(),
        tags: vec!["horror".into()],
        game_cover: Some("https://example.com/cover.jpg".into()),
        date_override: None,
        videos: video_ids
            .iter()
            .enumerate()
            .map(|(i, id)| PlaylistVideo {
                video_id: (*id).into(),
                title: Some(format!("Part {}", i + 1)),
                published_at: Some(Utc.with_ymd_and_hms(2024, 3, 1 + i as u32, 20, 0, 0).unwrap()),
                ..PlaylistVideo::default()
            })
            .collect(),
    }
}

#[test]
fn test_resolve_video_identifiers() {
    let db = test_db();
    let video_id = db
        .upsert_video(&NewVideo {
            youtube_id: "dQw4w9WgXcQ".into(),
            twitch_id: Some("2012345678".into()),
            ..NewVideo::default()
        })
        .unwrap();

    let resolve = |text: &str| {
        db.resolve_video_id(&VideoIdentifier::parse(text).unwrap())
            .unwrap()
    };
    assert_eq!(resolve(&video_id.to_string()), Some(video_id));
    assert_eq!(resolve("dQw4w9WgXcQ"), Some(video_id));
    assert_eq!(resolve("twitch:2012345678"), Some(video_id));
    assert_eq!(resolve("twitch:1"), None);
    assert_eq!(resolve("unknown"), None);
    assert_eq!(resolve("777"), None);

    assert_eq!(db.video_id_by_twitch_id("2012345678").unwrap(), Some(video_id));
    assert_eq!(db.youtube_id_for_video(video_id).unwrap().as_deref(), Some("dQw4w9WgXcQ"));
    assert_eq!(db.youtube_id_for_video(999).unwrap(), None);
}

#[test]
fn test_numeric_youtube_id_falls_back() {
    let db = test_db();
    add_video(&db, "first");
    let numeric = add_video(&db, "12345678901");

    let resolved = db
        .resolve_video_id(&VideoIdentifier::Internal(12345678901))
        .unwrap();
    assert_eq!(resolved, Some(numeric));
}

#[test]
fn test_upsert_video_keeps_existing_fields() {
    let db = test_db();
    let id = db
        .upsert_video(&NewVideo {
            youtube_id: "vid1".into(),
            name: Some("Original".into()),
            tags: Some(vec!["a".into(), "b".into()]),
            ..NewVideo::default()
        })
        .unwrap();
    let again = db
        .upsert_video(&NewVideo {
            youtube_id: "vid1".into(),
            twitch_id: Some("555".into()),
            ..NewVideo::default()
        })
        .unwrap();
    assert_eq!(id, again);

    let details = db.get_video_by_id(id).unwrap().unwrap();
    assert_eq!(details.video.name.as_deref(), Some("Original"));
    assert_eq!(details.video.tags, vec!["a", "b"]);
    assert_eq!(details.video.twitch_id.as_deref(), Some("555"));
    assert_eq!((details.order, details.total), (1, 1));
    assert_eq!(details.prev_id, None);
    assert_eq!(details.next_id, None);
}

#[test]
fn test_upsert_video_requires_youtube_id() {
    let db = test_db();
    let result = db.upsert_video(&NewVideo::default());
    assert!(matches!(result, Err(DbError::InvalidData(_))));
}

#[test]
fn test_twitch_ids_are_unique() {
    let db = test_db();
    let shared = |youtube_id: &str| NewVideo {
        youtube_id: youtube_id.into(),
        twitch_id: Some("42".into()),
        ..NewVideo::default()
    };
    db.upsert_video(&shared("a")).unwrap();
    assert!(matches!(db.upsert_video(&shared("b")), Err(DbError::Sqlite(_))));
}

#[test]
fn test_import_playlist_orders_videos() {
    let db = test_db();
    let result = db
        .import_playlist(&playlist_import("PL123", &["v1", "v2", "v3"]))
        .unwrap();
    assert!(result.stream_created);
    assert_eq!(result.video_ids.len(), 3);

    let middle = db.get_video_by_id(result.video_ids[1]).unwrap().unwrap();
    assert_eq!(middle.order, 2);
    assert_eq!(middle.total, 3);
    assert_eq!(middle.prev_id, Some(result.video_ids[0]));
    assert_eq!(middle.next_id, Some(result.video_ids[2]));
    assert_eq!(middle.video.name.as_deref(), Some("Part 2"));

    let last = db.get_video_by_id(result.video_ids[2]).unwrap().unwrap();
    assert_eq!(last.next_id, None);

    let playlist = db.get_playlist_by_id(result.playlist_id).unwrap().unwrap();
    assert_eq!(playlist.youtube_id, "PL123");
    assert_eq!(playlist.name.as_deref(), Some("Alien: Isolation"));
    assert_eq!(playlist.tags, vec!["horror"]);
    let order: Vec<i64> = playlist.videos.iter().map(|v| v.id).collect();
    assert_eq!(order, result.video_ids);
}

#[test]
fn test_reimport_updates_without_new_stream() {
    let db = test_db();
    let first = db
        .import_playlist(&playlist_import("PL123", &["v1", "v2"]))
        .unwrap();
    let second = db
        .import_playlist(&playlist_import("PL123", &["v2", "v1", "v3"]))
        .unwrap();

    assert!(!second.stream_created);
    assert_eq!(first.playlist_id, second.playlist_id);
    assert_eq!(second.video_ids[0], first.video_ids[1]);
    assert_eq!(count_rows(&db, "streams"), 1);
    assert_eq!(count_rows(&db, "videos"), 3);

    let moved = db.get_video_by_id(first.video_ids[0]).unwrap().unwrap();
    assert_eq!(moved.order, 2);
}

#[test]
fn test_import_playlist_rejects_blank_ids() {
    let db = test_db();
    let mut import = playlist_import("PL123", &["v1", ""]);
    assert!(matches!(db.import_playlist(&import), Err(DbError::InvalidData(_))));
    import.playlist_id = " ".into();
    assert!(matches!(db.import_playlist(&import), Err(DbError::InvalidData(_))));
    assert_eq!(count_rows(&db, "playlists"), 0);
}

#[test]
fn test_list_streams() {
    let db = test_db();
    let mut older = playlist_import("PL-old", &["a1"]);
    older.game_name = "Older".into();
    older.date_override = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    db.import_playlist(&older).unwrap();

    let newer = playlist_import("PL-new", &["b1", "b2"]);
    db.import_playlist(&newer).unwrap();

    let mut undated = playlist_import("PL-none", &[]);
    undated.game_name = "Undated".into();
    db.import_playlist(&undated).unwrap();

    let streams = db.list_streams().unwrap();
    let names: Vec<&str> = streams.iter().map(|s| s.game_name.as_str()).collect();
    assert_eq!(names, vec!["Alien: Isolation", "Older", "Undated"]);

    let newest = &streams[0];
    assert_eq!(newest.playlist_id.as_deref(), Some("PL-new"));
    assert_eq!(newest.first_video.as_deref(), Some("b1"));
    assert_eq!(newest.streams, 2);
    assert_eq!(
        newest.date_completed,
        Some(Utc.with_ymd_and_hms(2024, 3, 2, 20, 0, 0).unwrap())
    );
    assert_eq!(streams[2].first_video, None);
    assert_eq!(streams[2].streams, 1);
}

#[test]
fn test_resolve_playlist_id() {
    let db = test_db();
    let result = db.import_playlist(&playlist_import("PL123", &["v1"])).unwrap();

    assert_eq!(db.resolve_playlist_id("PL123").unwrap(), Some(result.playlist_id));
    assert_eq!(
        db.resolve_playlist_id(&result.playlist_id.to_string()).unwrap(),
        Some(result.playlist_id)
    );
    assert_eq!(db.resolve_playlist_id("PL999").unwrap(), None);
    assert_eq!(db.resolve_playlist_id("").unwrap(), None);
    assert!(db.get_playlist_by_id(999).unwrap().is_none());
}
