//! Authentication primitives
//!
//! - [`TokenManager`]: HS256 access and refresh tokens
//! - [`password`]: bcrypt hashing on the blocking pool

pub mod password;
pub mod tokens;

pub use tokens::{Claims, TokenManager};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
