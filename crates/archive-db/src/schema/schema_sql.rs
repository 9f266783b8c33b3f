pub(super) const TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS playlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    youtube_id TEXT NOT NULL UNIQUE,
    name TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS videos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    yt_id TEXT NOT NULL UNIQUE,
    twitch_id TEXT,
    name TEXT,
    description TEXT,
    duration TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    playlist_id INTEGER REFERENCES playlists(id) ON DELETE SET NULL,
    playlist_order INTEGER,
    published_at TIMESTAMP,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS streams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_name TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    stream_count INTEGER NOT NULL DEFAULT 1,
    playlist_id INTEGER REFERENCES playlists(id) ON DELETE SET NULL,
    first_video_id INTEGER REFERENCES videos(id) ON DELETE SET NULL,
    date_completed TIMESTAMP,
    game_cover TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS chat_badges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    set_version TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS chat_emotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    emote_id TEXT NOT NULL,
    source TEXT NOT NULL,
    UNIQUE(text, emote_id, source)
);

CREATE TABLE IF NOT EXISTS chat_users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    UNIQUE(name, color)
);

CREATE TABLE IF NOT EXISTS chat_metadata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id INTEGER NOT NULL UNIQUE REFERENCES videos(id) ON DELETE CASCADE,
    twitch_video_id TEXT,
    total_messages INTEGER NOT NULL DEFAULT 0,
    duration INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metadata_id INTEGER NOT NULL REFERENCES chat_metadata(id) ON DELETE CASCADE,
    time_seconds INTEGER NOT NULL,
    user_id INTEGER NOT NULL REFERENCES chat_users(id),
    message TEXT NOT NULL DEFAULT '',
    badges TEXT NOT NULL DEFAULT '[]',
    emotes TEXT NOT NULL DEFAULT '[]'
);
"#;

pub(super) const INDEXES: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_videos_twitch_id
    ON videos(twitch_id)
    WHERE twitch_id IS NOT NULL AND twitch_id != '';

CREATE INDEX IF NOT EXISTS idx_videos_playlist
    ON videos(playlist_id, playlist_order);

CREATE INDEX IF NOT EXISTS idx_streams_playlist_id
    ON streams(playlist_id);

CREATE INDEX IF NOT EXISTS idx_chat_messages_window
    ON chat_messages(metadata_id, time_seconds, id);
"#;
