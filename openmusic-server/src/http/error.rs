//! API error types with IntoResponse
//!
//! Client errors become a `{"status": "fail", "message": ...}` envelope with a
//! 4xx code. Everything else is logged and reported as a generic 500.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::envelope::Envelope;
use crate::auth::AuthError;
use crate::cache::CacheError;
use crate::db::DbError;
use crate::models::ValidationError;
use crate::queue::PublishError;
use crate::services::ServiceError;
use crate::storage::StorageError;

pub const SERVER_FAILURE_MESSAGE: &str = "Sorry, our server failed to handle the request.";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Payload failed validation (400)
    Validation(ValidationError),

    /// Request conflicts with stored state (400)
    Invariant { message: String },

    /// Missing or bad credentials (401)
    Unauthenticated { message: String },

    Forbidden { reason: String },

    NotFound { resource: &'static str, id: String },

    PayloadTooLarge { max: usize },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Invariant { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(e) => Envelope::fail(e.to_string()),
            Self::Invariant { message } => Envelope::fail(message),
            Self::Unauthenticated { message } => Envelope::fail(message),
            Self::Forbidden { reason } => Envelope::fail(reason),
            Self::NotFound { resource, id } => {
                Envelope::fail(format!("{} '{}' not found", resource, id))
            }
            Self::PayloadTooLarge { max } => {
                Envelope::fail(format!("payload exceeds {} bytes", max))
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                Envelope::error(SERVER_FAILURE_MESSAGE)
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                Envelope::error(SERVER_FAILURE_MESSAGE)
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { resource, reason } => {
                Self::invariant(format!("{} {}", resource, reason))
            }
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Db(e) => e.into(),
            ServiceError::Cache(e) => e.into(),
            ServiceError::Invariant(message) => Self::invariant(message),
            ServiceError::Forbidden(reason) => Self::Forbidden {
                reason: reason.to_string(),
            },
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<PublishError> for ApiError {
    fn from(e: PublishError) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge {
                max: crate::storage::MAX_COVER_BYTES,
            }
        } else {
            Self::Validation(ValidationError::Malformed(e.body_text()))
        }
    }
}
