//! Playlist membership

use openmusic_core::generate_id;
use sqlx::PgPool;

use super::{DbError, SongSummary};

pub struct PlaylistSongRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PlaylistSongRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a song; adding it twice is a conflict.
    pub async fn add(&self, playlist_id: &str, song_id: &str) -> Result<String, DbError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO playlist_songs (id, playlist_id, song_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(generate_id("playlist_song"))
        .bind(playlist_id)
        .bind(song_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "playlist song"))?;

        Ok(id)
    }

    pub async fn list(&self, playlist_id: &str) -> Result<Vec<SongSummary>, DbError> {
        let songs = sqlx::query_as::<_, SongSummary>(
            r#"
            SELECT s.id, s.title, s.performer
            FROM playlist_songs ps
            JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = $1
            ORDER BY s.title
            "#,
        )
        .bind(playlist_id)
        .fetch_all(self.pool)
        .await?;

        Ok(songs)
    }

    pub async fn remove(&self, playlist_id: &str, song_id: &str) -> Result<(), DbError> {
        let result =
            sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = $1 AND song_id = $2")
                .bind(playlist_id)
                .bind(song_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("playlist song", song_id));
        }
        Ok(())
    }
}
