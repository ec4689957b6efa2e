//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::RecentCache;
use crate::config::ServerConfig;
use crate::realtime::RealtimeHub;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    realtime: RealtimeHub,
    recent: RecentCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                realtime: RealtimeHub::new(),
                recent: RecentCache::new(),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the realtime broadcast hub.
    #[must_use]
    pub fn realtime(&self) -> &RealtimeHub {
        &self.inner.realtime
    }

    /// Get a reference to the landing page feed cache.
    #[must_use]
    pub fn recent(&self) -> &RecentCache {
        &self.inner.recent
    }
}
