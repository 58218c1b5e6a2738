//! Album repository

use openmusic_core::generate_id;
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Album record from database
#[derive(Debug, Clone, FromRow)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
}

pub struct AlbumRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AlbumRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an album and return its generated id.
    pub async fn create(&self, name: &str, year: i32) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO albums (id, name, year)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(generate_id("album"))
        .bind(name)
        .bind(year)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "album"))?;

        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Album, DbError> {
        sqlx::query_as::<_, Album>("SELECT id, name, year, cover_url FROM albums WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("album", id))
    }

    pub async fn update(&self, id: &str, name: &str, year: i32) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE albums SET name = $1, year = $2 WHERE id = $3")
            .bind(name)
            .bind(year)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("album", id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("album", id));
        }
        Ok(())
    }

    pub async fn set_cover(&self, id: &str, cover_url: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE albums SET cover_url = $1 WHERE id = $2")
            .bind(cover_url)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("album", id));
        }
        Ok(())
    }

    /// Fail with `NotFound` unless the album exists.
    pub async fn verify(&self, id: &str) -> Result<(), DbError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM albums WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(DbError::not_found("album", id))
        }
    }
}
