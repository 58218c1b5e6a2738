//! Album likes

use openmusic_core::generate_id;
use sqlx::PgPool;

use super::DbError;

pub struct AlbumLikeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AlbumLikeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, user_id: &str, album_id: &str) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO album_likes (id, user_id, album_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(generate_id("album_like"))
        .bind(user_id)
        .bind(album_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "album like"))?;

        Ok(id)
    }

    /// Returns whether a like row was removed.
    pub async fn remove(&self, user_id: &str, album_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM album_likes WHERE user_id = $1 AND album_id = $2")
            .bind(user_id)
            .bind(album_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn has_liked(&self, user_id: &str, album_id: &str) -> Result<bool, DbError> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM album_likes WHERE user_id = $1 AND album_id = $2)",
        )
        .bind(user_id)
        .bind(album_id)
        .fetch_one(self.pool)
        .await?;

        Ok(liked)
    }

    pub async fn count(&self, album_id: &str) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM album_likes WHERE album_id = $1")
            .bind(album_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
