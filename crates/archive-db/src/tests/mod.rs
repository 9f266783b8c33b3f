use crate::Database;
use crate::catalog::NewVideo;

fn test_db() -> Database {
    Database::open_in_memory().expect("Failed to create test DB")
}

fn add_video(db: &Database, youtube_id: &str) -> i64 {
    db.upsert_video(&NewVideo {
        youtube_id: youtube_id.into(),
        ..NewVideo::default()
    })
    .expect("Failed to insert video")
}

fn count_rows(db: &Database, table: &str) -> i64 {
    db.with_conn(|conn| {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .map_err(Into::into)
    })
    .unwrap()
}

mod catalog;
