//! User registration and lookup

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::hash_password;
use crate::db::{DbError, UserRepo};
use crate::http::envelope::{created, ok, ApiResult, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::{max_len, non_empty, ValidationError};

const MAX_USERNAME_LEN: usize = 50;

/// Body of POST /users
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

struct Registration {
    username: String,
    password: String,
    fullname: String,
}

impl RegisterRequest {
    fn validate(self) -> Result<Registration, ValidationError> {
        let username = non_empty("username", &self.username)?;
        max_len("username", &username, MAX_USERNAME_LEN)?;
        if self.password.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        Ok(Registration {
            username,
            password: self.password,
            fullname: non_empty("fullname", &self.fullname)?,
        })
    }
}

/// POST /users
async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<Value> {
    let reg = req.validate()?;
    let hash = hash_password(reg.password).await?;

    let user_id = UserRepo::new(&state.pool)
        .create(&reg.username, &hash, &reg.fullname)
        .await
        .map_err(|e| match e {
            DbError::Conflict { .. } => ApiError::invariant("Username already taken"),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user_id, "User registered");
    created(Envelope::success(json!({ "userId": user_id })).with_message("User added"))
}

/// GET /users/{id}
async fn get_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Value> {
    let user = UserRepo::new(&state.pool).get(&id).await?;
    ok(Envelope::success(json!({ "user": user })))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register))
        .route("/users/{id}", get(get_user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::{body_json, json_request, router as app};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            fullname: "Chris Martin".into(),
        }
    }

    #[test]
    fn username_length_is_capped() {
        let long = "u".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(
            request(&long, "secret").validate(),
            Err(ValidationError::TooLong { field: "username", .. })
        ));
        assert!(request(&"u".repeat(MAX_USERNAME_LEN), "secret")
            .validate()
            .is_ok());
    }

    #[test]
    fn password_is_required() {
        assert!(matches!(
            request("chris", "").validate(),
            Err(ValidationError::Empty { field: "password" })
        ));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request("POST", "/users", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], "fail");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_username_is_conflict() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let repo = UserRepo::new(&pool);
        let username = openmusic_core::generate_id("dup");
        repo.create(&username, "hash", "First").await.unwrap();
        let err = repo.create(&username, "hash", "Second").await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }
}
