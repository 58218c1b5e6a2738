//! Playlist collaborators

use openmusic_core::generate_id;
use sqlx::PgPool;

use super::DbError;

pub struct CollaborationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CollaborationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, playlist_id: &str, user_id: &str) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO collaborations (id, playlist_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(generate_id("collab"))
        .bind(playlist_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "collaboration"))?;

        Ok(id)
    }

    pub async fn remove(&self, playlist_id: &str, user_id: &str) -> Result<(), DbError> {
        let result =
            sqlx::query("DELETE FROM collaborations WHERE playlist_id = $1 AND user_id = $2")
                .bind(playlist_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("collaboration", playlist_id));
        }
        Ok(())
    }

    pub async fn exists(&self, playlist_id: &str, user_id: &str) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM collaborations WHERE playlist_id = $1 AND user_id = $2)",
        )
        .bind(playlist_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}
