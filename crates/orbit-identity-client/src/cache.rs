//! Process-local, TTL-bound cache of authority user records.
//!
//! The key format is fixed (`user_id_<id>`) so the client and every
//! invalidation path agree. Entries are always fully replaced, never
//! partially mutated; last writer wins.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::proto::UserRecord;

/// Upper bound on resident entries; TTL expiry is the real eviction policy.
const MAX_CACHED_USERS: u64 = 100_000;

/// Cache key for a user record.
#[must_use]
pub fn user_key(id: i64) -> String {
    format!("user_id_{id}")
}

/// In-memory cache of decoded user records.
#[derive(Clone)]
pub struct UserCache {
    cache: Cache<String, Arc<UserRecord>>,
}

impl UserCache {
    /// Create a cache whose entries live for `ttl_secs`. `0` disables
    /// expiry.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        let mut builder = Cache::builder().max_capacity(MAX_CACHED_USERS);
        if ttl_secs > 0 {
            builder = builder.time_to_live(Duration::from_secs(ttl_secs));
        }
        Self {
            cache: builder.build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<UserRecord>> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: String, record: Arc<UserRecord>) {
        self.cache.insert(key, record).await;
    }

    pub async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }
}
