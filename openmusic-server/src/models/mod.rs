//! Request validation
//!
//! Handlers deserialize request bodies into plain structs and validate
//! them into the types here. Invalid input returns ValidationError, not panic.

pub mod email;
pub mod validation;

pub use email::EmailAddress;
pub use validation::{max_len, non_empty, ValidationError};
