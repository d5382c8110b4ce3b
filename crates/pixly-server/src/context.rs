//! Application context shared by every handler via Axum state.

use std::sync::Arc;
use std::time::Duration;

use pixly_core::config::Config;
use pixly_db::pool::DbPool;

use crate::storage::{self, ObjectStore};

/// Cheaply cloneable handle on the pool, configuration and object store.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Where image bytes live.
    pub store: Arc<dyn ObjectStore>,
    /// Shared client for external image URLs, with the configured timeout.
    pub http: reqwest::Client,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config, store: Arc<dyn ObjectStore>) -> Self {
        let http = storage::http_client(Duration::from_secs(config.storage.fetch_timeout_secs));
        Self {
            db,
            config: Arc::new(config),
            store,
            http,
        }
    }
}
