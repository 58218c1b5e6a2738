//! Logic shared by several handlers, sitting between routes and repositories
//!
//! - [`likes`]: cache-aside album like counter
//! - [`access`]: playlist ownership and collaboration checks

pub mod access;
pub mod likes;

pub use access::PlaylistAccess;
pub use likes::{LikeCount, LikeService, LikeSource, LikeToggle};

use crate::cache::CacheError;
use crate::db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Invariant(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}
