//! Playlist repository

use openmusic_core::generate_id;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Playlist joined with its owner's username
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub username: String,
}

pub struct PlaylistRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PlaylistRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, owner: &str) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO playlists (id, name, owner)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(generate_id("playlist"))
        .bind(name)
        .bind(owner)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "playlist"))?;

        Ok(id)
    }

    /// Playlists the user owns or collaborates on.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, DbError> {
        let playlists = sqlx::query_as::<_, PlaylistSummary>(
            r#"
            SELECT DISTINCT p.id, p.name, u.username
            FROM playlists p
            JOIN users u ON u.id = p.owner
            LEFT JOIN collaborations c ON c.playlist_id = p.id
            WHERE p.owner = $1 OR c.user_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(playlists)
    }

    pub async fn get(&self, id: &str) -> Result<PlaylistSummary, DbError> {
        sqlx::query_as::<_, PlaylistSummary>(
            r#"
            SELECT p.id, p.name, u.username
            FROM playlists p
            JOIN users u ON u.id = p.owner
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("playlist", id))
    }

    /// Owner's user id.
    pub async fn owner_of(&self, id: &str) -> Result<String, DbError> {
        sqlx::query_scalar::<_, String>("SELECT owner FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("playlist", id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("playlist", id));
        }
        Ok(())
    }
}
