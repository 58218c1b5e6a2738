//! Cache-aside album like counter
//!
//! Reads try the cache first and fall back to a COUNT query, repopulating the
//! cache. Writes mutate the table and then drop the cached count. A read that
//! races a write can put a stale count back until it expires; that window is
//! accepted. An album nobody has liked is an invariant failure and is never
//! cached.

use std::time::Duration;

use sqlx::PgPool;

use super::ServiceError;
use crate::cache::{album_likes_key, CacheStore};
use crate::db::{AlbumLikeRepo, AlbumRepo};

pub const NO_LIKES_MESSAGE: &str = "Album has no likes yet";

/// Where a like count came from, reported in `X-Data-Source`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeSource {
    Cache,
    Database,
}

impl LikeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Database => "db",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeCount {
    pub count: i64,
    pub source: LikeSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeToggle {
    Liked { like_id: String },
    Unliked,
}

pub struct LikeService<'a> {
    pool: &'a PgPool,
    cache: &'a dyn CacheStore,
    expiry: Duration,
}

impl<'a> LikeService<'a> {
    pub fn new(pool: &'a PgPool, cache: &'a dyn CacheStore, expiry: Duration) -> Self {
        Self {
            pool,
            cache,
            expiry,
        }
    }

    pub async fn likes_count(&self, album_id: &str) -> Result<LikeCount, ServiceError> {
        let key = album_likes_key(album_id);

        if let Some(count) = cached_count(self.cache, &key).await {
            return Ok(LikeCount {
                count,
                source: LikeSource::Cache,
            });
        }

        AlbumRepo::new(self.pool).verify(album_id).await?;
        let count = AlbumLikeRepo::new(self.pool).count(album_id).await?;
        if count == 0 {
            return Err(ServiceError::Invariant(NO_LIKES_MESSAGE));
        }

        if let Err(e) = self.cache.set(&key, &count.to_string(), self.expiry).await {
            tracing::warn!(error = %e, key = %key, "Failed to cache like count");
        }

        Ok(LikeCount {
            count,
            source: LikeSource::Database,
        })
    }

    /// Like the album, or remove the like if the user already liked it.
    pub async fn toggle_like(
        &self,
        user_id: &str,
        album_id: &str,
    ) -> Result<LikeToggle, ServiceError> {
        AlbumRepo::new(self.pool).verify(album_id).await?;

        let likes = AlbumLikeRepo::new(self.pool);
        let outcome = if likes.has_liked(user_id, album_id).await? {
            likes.remove(user_id, album_id).await?;
            LikeToggle::Unliked
        } else {
            let like_id = likes.add(user_id, album_id).await?;
            LikeToggle::Liked { like_id }
        };

        self.cache.delete(&album_likes_key(album_id)).await?;

        tracing::debug!(album_id, user_id, ?outcome, "Album like toggled");
        Ok(outcome)
    }
}

/// Cached count for `key`; cache errors and unparsable values count as a miss.
async fn cached_count(cache: &dyn CacheStore, key: &str) -> Option<i64> {
    match cache.get(key).await {
        Ok(Some(value)) => match value.parse::<i64>() {
            Ok(count) => Some(count),
            Err(_) => {
                tracing::warn!(key, value = %value, "Ignoring unparsable cached count");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, key, "Cache read failed, falling back to database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[test]
    fn source_header_values() {
        assert_eq!(LikeSource::Cache.as_str(), "cache");
        assert_eq!(LikeSource::Database.as_str(), "db");
    }

    #[tokio::test]
    async fn cached_count_hits() {
        let cache = MemoryCache::new();
        cache
            .set("album_likes:a", "4", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cached_count(&cache, "album_likes:a").await, Some(4));
        assert_eq!(cached_count(&cache, "album_likes:b").await, None);
    }

    #[tokio::test]
    async fn garbage_in_cache_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("album_likes:a", "lots", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cached_count(&cache, "album_likes:a").await, None);
    }

    #[tokio::test]
    async fn cached_count_skips_database() {
        // A lazy pool never connects; a cache hit must not touch it.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/openmusic_unused")
            .unwrap();
        let cache = MemoryCache::new();
        cache
            .set(&album_likes_key("album-1"), "9", Duration::from_secs(60))
            .await
            .unwrap();

        let service = LikeService::new(&pool, &cache, Duration::from_secs(60));
        let count = service.likes_count("album-1").await.unwrap();
        assert_eq!(
            count,
            LikeCount {
                count: 9,
                source: LikeSource::Cache
            }
        );
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn toggle_invalidates_cache() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let album_id = AlbumRepo::new(&pool).create("Ghost Stories", 2014).await.unwrap();
        let user_id = crate::db::UserRepo::new(&pool)
            .create(&openmusic_core::generate_id("liker"), "hash", "Liker")
            .await
            .unwrap();

        let cache = MemoryCache::new();
        let service = LikeService::new(&pool, &cache, Duration::from_secs(60));

        let toggled = service.toggle_like(&user_id, &album_id).await.unwrap();
        assert!(matches!(toggled, LikeToggle::Liked { .. }));

        let first = service.likes_count(&album_id).await.unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(first.source, LikeSource::Database);
        assert_eq!(
            service.likes_count(&album_id).await.unwrap().source,
            LikeSource::Cache
        );

        assert_eq!(
            service.toggle_like(&user_id, &album_id).await.unwrap(),
            LikeToggle::Unliked
        );
        let err = service.likes_count(&album_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invariant(NO_LIKES_MESSAGE)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unliked_album_is_invariant_and_not_cached() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let album_id = AlbumRepo::new(&pool).create("Parachutes", 2000).await.unwrap();
        let cache = MemoryCache::new();
        let service = LikeService::new(&pool, &cache, Duration::from_secs(60));

        let err = service.likes_count(&album_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invariant(NO_LIKES_MESSAGE)));
        assert!(cache
            .get(&album_likes_key(&album_id))
            .await
            .unwrap()
            .is_none());
    }
}
