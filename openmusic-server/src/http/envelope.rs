//! `{status, message, data}` response envelope

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T = ()> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Handler result: status code plus envelope, or an `ApiError`
pub type ApiResult<T = ()> = Result<(StatusCode, Json<Envelope<T>>), super::ApiError>;

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            data: None,
        }
    }
}

pub fn ok<T: Serialize>(envelope: Envelope<T>) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(envelope)))
}

pub fn created<T: Serialize>(envelope: Envelope<T>) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(envelope)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_empty_fields() {
        let value = serde_json::to_value(Envelope::message("Album deleted")).unwrap();
        assert_eq!(value, json!({"status": "success", "message": "Album deleted"}));
    }

    #[test]
    fn carries_data() {
        let value =
            serde_json::to_value(Envelope::success(json!({"albumId": "album-1"})).with_message("Album added"))
                .unwrap();
        assert_eq!(value["data"]["albumId"], "album-1");
        assert_eq!(value["message"], "Album added");
    }
}
