//! Playlist access rules
//!
//! Owners may do everything. Collaborators may read the playlist, change its
//! songs and export it. Collaboration lookups are cached and the cached
//! entry is dropped whenever a collaboration is added or removed.

use std::time::Duration;

use sqlx::PgPool;

use super::ServiceError;
use crate::cache::{collaboration_key, CacheStore};
use crate::db::{CollaborationRepo, PlaylistRepo, UserRepo};

const NOT_OWNER: &str = "you are not the owner of this playlist";
const NO_ACCESS: &str = "you do not have access to this playlist";

pub struct PlaylistAccess<'a> {
    pool: &'a PgPool,
    cache: &'a dyn CacheStore,
    expiry: Duration,
}

impl<'a> PlaylistAccess<'a> {
    pub fn new(pool: &'a PgPool, cache: &'a dyn CacheStore, expiry: Duration) -> Self {
        Self {
            pool,
            cache,
            expiry,
        }
    }

    /// `NotFound` for an unknown playlist, `Forbidden` for anyone but the owner.
    pub async fn verify_owner(&self, playlist_id: &str, user_id: &str) -> Result<(), ServiceError> {
        let owner = PlaylistRepo::new(self.pool).owner_of(playlist_id).await?;
        if owner != user_id {
            return Err(ServiceError::Forbidden(NOT_OWNER));
        }
        Ok(())
    }

    /// Owner or collaborator.
    pub async fn verify_access(&self, playlist_id: &str, user_id: &str) -> Result<(), ServiceError> {
        let owner = PlaylistRepo::new(self.pool).owner_of(playlist_id).await?;
        if owner == user_id {
            return Ok(());
        }
        if self.is_collaborator(playlist_id, user_id).await? {
            return Ok(());
        }
        Err(ServiceError::Forbidden(NO_ACCESS))
    }

    pub async fn is_collaborator(
        &self,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<bool, ServiceError> {
        let key = collaboration_key(playlist_id, user_id);

        match self.cache.get(&key).await {
            Ok(Some(value)) => return Ok(value == "1"),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, key = %key, "Cache read failed"),
        }

        let exists = CollaborationRepo::new(self.pool)
            .exists(playlist_id, user_id)
            .await?;

        let value = if exists { "1" } else { "0" };
        if let Err(e) = self.cache.set(&key, value, self.expiry).await {
            tracing::warn!(error = %e, key = %key, "Failed to cache collaboration");
        }

        Ok(exists)
    }

    /// Owner-only. The collaborator must be an existing user.
    pub async fn add_collaborator(
        &self,
        owner_id: &str,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<String, ServiceError> {
        self.verify_owner(playlist_id, owner_id).await?;
        UserRepo::new(self.pool).verify(user_id).await?;

        let id = CollaborationRepo::new(self.pool)
            .add(playlist_id, user_id)
            .await?;
        self.cache
            .delete(&collaboration_key(playlist_id, user_id))
            .await?;

        tracing::info!(playlist_id, user_id, "Collaborator added");
        Ok(id)
    }

    pub async fn remove_collaborator(
        &self,
        owner_id: &str,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<(), ServiceError> {
        self.verify_owner(playlist_id, owner_id).await?;

        CollaborationRepo::new(self.pool)
            .remove(playlist_id, user_id)
            .await?;
        self.cache
            .delete(&collaboration_key(playlist_id, user_id))
            .await?;

        tracing::info!(playlist_id, user_id, "Collaborator removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[tokio::test]
    async fn cached_collaboration_skips_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/openmusic_unused")
            .unwrap();
        let cache = MemoryCache::new();
        cache
            .set(
                &collaboration_key("playlist-1", "user-2"),
                "1",
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        cache
            .set(
                &collaboration_key("playlist-1", "user-3"),
                "0",
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let access = PlaylistAccess::new(&pool, &cache, Duration::from_secs(60));
        assert!(access.is_collaborator("playlist-1", "user-2").await.unwrap());
        assert!(!access.is_collaborator("playlist-1", "user-3").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn collaborator_gains_and_loses_access() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let users = UserRepo::new(&pool);
        let owner = users
            .create(&openmusic_core::generate_id("owner"), "hash", "Owner")
            .await
            .unwrap();
        let guest = users
            .create(&openmusic_core::generate_id("guest"), "hash", "Guest")
            .await
            .unwrap();
        let playlist = PlaylistRepo::new(&pool).create("Shared", &owner).await.unwrap();

        let cache = MemoryCache::new();
        let access = PlaylistAccess::new(&pool, &cache, Duration::from_secs(60));

        assert!(matches!(
            access.verify_access(&playlist, &guest).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));

        access.add_collaborator(&owner, &playlist, &guest).await.unwrap();
        access.verify_access(&playlist, &guest).await.unwrap();
        assert!(access.verify_owner(&playlist, &guest).await.is_err());

        access
            .remove_collaborator(&owner, &playlist, &guest)
            .await
            .unwrap();
        assert!(access.verify_access(&playlist, &guest).await.is_err());
    }
}
