//! Song repository

use openmusic_core::{generate_id, ExportedSong};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Full song record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

/// Song as listed inside albums, playlists and search results
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub performer: String,
}

impl From<SongSummary> for ExportedSong {
    fn from(s: SongSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            performer: s.performer,
        }
    }
}

/// Fields written on create and update
#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

/// Case-insensitive substring filters for `GET /songs`
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub title: Option<String>,
    pub performer: Option<String>,
}

/// `ILIKE` pattern matching `needle` literally anywhere in the value.
/// Postgres treats `\` as the default escape character.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct SongRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SongRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, song: &NewSong) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO songs (id, title, year, genre, performer, duration, album_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(generate_id("song"))
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.genre)
        .bind(&song.performer)
        .bind(song.duration)
        .bind(song.album_id.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "song"))?;

        Ok(id)
    }

    pub async fn list(&self, filter: &SongFilter) -> Result<Vec<SongSummary>, DbError> {
        let songs = sqlx::query_as::<_, SongSummary>(
            r#"
            SELECT id, title, performer
            FROM songs
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR performer ILIKE $2)
            ORDER BY title
            "#,
        )
        .bind(filter.title.as_deref().map(contains_pattern))
        .bind(filter.performer.as_deref().map(contains_pattern))
        .fetch_all(self.pool)
        .await?;

        Ok(songs)
    }

    pub async fn list_by_album(&self, album_id: &str) -> Result<Vec<SongSummary>, DbError> {
        let songs = sqlx::query_as::<_, SongSummary>(
            "SELECT id, title, performer FROM songs WHERE album_id = $1 ORDER BY title",
        )
        .bind(album_id)
        .fetch_all(self.pool)
        .await?;

        Ok(songs)
    }

    pub async fn get(&self, id: &str) -> Result<Song, DbError> {
        sqlx::query_as::<_, Song>(
            r#"
            SELECT id, title, year, genre, performer, duration, album_id
            FROM songs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("song", id))
    }

    pub async fn update(&self, id: &str, song: &NewSong) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET title = $1, year = $2, genre = $3, performer = $4, duration = $5, album_id = $6
            WHERE id = $7
            "#,
        )
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.genre)
        .bind(&song.performer)
        .bind(song.duration)
        .bind(song.album_id.as_deref())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "song"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("song", id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("song", id));
        }
        Ok(())
    }

    pub async fn verify(&self, id: &str) -> Result<(), DbError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM songs WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(DbError::not_found("song", id))
        }
    }
}
