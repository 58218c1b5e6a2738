//! Export worker errors

use openmusic_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("amqp error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build email: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
