//! Schema migrations for the catalog tables
//!
//! Every statement is idempotent so `run` is safe on each startup.

use sqlx::PgPool;

/// Tables in dependency order (referenced tables first)
const TABLES: &[(&str, &str)] = &[
    (
        "albums",
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            year INTEGER NOT NULL,
            cover_url TEXT
        )
        "#,
    ),
    (
        "songs",
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            year INTEGER NOT NULL,
            genre TEXT NOT NULL,
            performer TEXT NOT NULL,
            duration INTEGER,
            album_id TEXT REFERENCES albums(id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username VARCHAR(50) NOT NULL UNIQUE,
            password TEXT NOT NULL,
            fullname TEXT NOT NULL
        )
        "#,
    ),
    (
        "authentications",
        r#"
        CREATE TABLE IF NOT EXISTS authentications (
            token TEXT PRIMARY KEY
        )
        "#,
    ),
    (
        "playlists",
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            owner TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "playlist_songs",
        r#"
        CREATE TABLE IF NOT EXISTS playlist_songs (
            id TEXT PRIMARY KEY,
            playlist_id TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            song_id TEXT NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            CONSTRAINT unique_playlist_id_and_song_id UNIQUE (playlist_id, song_id)
        )
        "#,
    ),
    (
        "collaborations",
        r#"
        CREATE TABLE IF NOT EXISTS collaborations (
            id TEXT PRIMARY KEY,
            playlist_id TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            CONSTRAINT unique_playlist_id_and_user_id UNIQUE (playlist_id, user_id)
        )
        "#,
    ),
    (
        "album_likes",
        r#"
        CREATE TABLE IF NOT EXISTS album_likes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            album_id TEXT NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
            CONSTRAINT unique_album_id_and_user_id UNIQUE (album_id, user_id)
        )
        "#,
    ),
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running catalog migrations...");

    for &(table, ddl) in TABLES {
        tracing::debug!(table, "ensuring table");
        sqlx::query(ddl).execute(pool).await?;
    }

    create_indexes(pool).await?;

    tracing::info!(tables = TABLES.len(), "Catalog migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_album ON songs(album_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_playlists_owner ON playlists(owner)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_collaborations_user ON collaborations(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}
