//! Key/value cache with expiry
//!
//! Used cache-aside in front of album like counts and collaboration checks.
//! [`RedisCache`] is the production backend; [`MemoryCache`] keeps a single
//! process working without Redis and backs the handler tests.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value for `key`, or `None` when missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, expiry: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache key for an album's like count
pub fn album_likes_key(album_id: &str) -> String {
    format!("album_likes:{}", album_id)
}

/// Cache key for a collaboration check
pub fn collaboration_key(playlist_id: &str, user_id: &str) -> String {
    format!("collaborations:{}:{}", playlist_id, user_id)
}
