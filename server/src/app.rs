use std::sync::Arc;

use archive_db::Database;

use crate::config::AppConfig;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    db: Database,
}

impl SharedState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(SharedStateInner { config, db }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}
