//! Repository implementations for database access
//!
//! Each repository borrows the pool and maps one method to one statement.
//! Uniqueness and foreign keys are enforced by the schema; violations come
//! back as [`DbError::Conflict`].

pub mod album_likes;
pub mod albums;
pub mod authentications;
pub mod collaborations;
pub mod playlist_songs;
pub mod playlists;
pub mod songs;
pub mod users;

pub use album_likes::AlbumLikeRepo;
pub use albums::{Album, AlbumRepo};
pub use authentications::AuthenticationRepo;
pub use collaborations::CollaborationRepo;
pub use playlist_songs::PlaylistSongRepo;
pub use playlists::{PlaylistRepo, PlaylistSummary};
pub use songs::{NewSong, Song, SongFilter, SongRepo, SongSummary};
pub use users::{User, UserCredentials, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict on {resource}: {reason}")]
    Conflict {
        resource: &'static str,
        reason: &'static str,
    },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Classify a write error, turning constraint violations into conflicts.
    pub(crate) fn from_write(err: sqlx::Error, resource: &'static str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict {
                    resource,
                    reason: "already exists",
                };
            }
            if db.is_foreign_key_violation() {
                return Self::Conflict {
                    resource,
                    reason: "references a record that does not exist",
                };
            }
        }
        Self::Sqlx(err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
