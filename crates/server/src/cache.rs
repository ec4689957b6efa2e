//! Read-through cache for the landing page feed.
//!
//! `GET /api/wishlists/recent` is hit on every landing page view. Rows are
//! cached for a minute and dropped on any wishlist, item or pledge write.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::models::RecentWishlist;

const RECENT_TTL: Duration = Duration::from_secs(60);

/// Cached recent-wishlist feeds, keyed by limit.
#[derive(Clone)]
pub struct RecentCache {
    inner: Cache<u32, Arc<Vec<RecentWishlist>>>,
}

impl Default for RecentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let inner = Cache::builder()
            .max_capacity(16)
            .time_to_live(RECENT_TTL)
            .build();
        Self { inner }
    }

    /// Cached feed for `limit`, if still fresh.
    pub async fn get(&self, limit: u32) -> Option<Arc<Vec<RecentWishlist>>> {
        self.inner.get(&limit).await
    }

    /// Store a freshly loaded feed.
    pub async fn insert(&self, limit: u32, rows: Arc<Vec<RecentWishlist>>) {
        self.inner.insert(limit, rows).await;
    }

    /// Drop every cached feed.
    pub async fn invalidate(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }
}
