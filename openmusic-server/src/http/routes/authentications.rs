//! Login, token refresh and logout
//!
//! Refresh tokens are recorded on login and removed on logout; a refresh
//! token must be both correctly signed and still recorded to be accepted.

use std::sync::Arc;

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::verify_password;
use crate::db::{AuthenticationRepo, DbError, UserRepo};
use crate::http::envelope::{created, ok, ApiResult, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::non_empty;

const BAD_CREDENTIALS: &str = "The credentials you provided are wrong";
const BAD_REFRESH_TOKEN: &str = "Refresh token is not valid";

/// Body of POST /authentications
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of PUT and DELETE /authentications
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn refresh_error(e: DbError) -> ApiError {
    if e.is_not_found() {
        ApiError::invariant(BAD_REFRESH_TOKEN)
    } else {
        e.into()
    }
}

/// POST /authentications
async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Value> {
    let username = non_empty("username", &req.username)?;
    non_empty("password", &req.password)?;

    let credentials = UserRepo::new(&state.pool)
        .find_credentials(&username)
        .await?
        .ok_or_else(|| ApiError::unauthenticated(BAD_CREDENTIALS))?;

    if !verify_password(req.password, credentials.password).await? {
        return Err(ApiError::unauthenticated(BAD_CREDENTIALS));
    }

    let access_token = state.tokens.generate_access_token(&credentials.id)?;
    let refresh_token = state.tokens.generate_refresh_token(&credentials.id)?;
    AuthenticationRepo::new(&state.pool)
        .add(&refresh_token)
        .await?;

    tracing::info!(user_id = %credentials.id, "User logged in");
    created(
        Envelope::success(json!({
            "accessToken": access_token,
            "refreshToken": refresh_token,
        }))
        .with_message("Authentication added"),
    )
}

/// PUT /authentications
async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Value> {
    let token = non_empty("refreshToken", &req.refresh_token)?;

    let user_id = state
        .tokens
        .verify_refresh_token(&token)
        .map_err(|_| ApiError::invariant(BAD_REFRESH_TOKEN))?;
    AuthenticationRepo::new(&state.pool)
        .verify(&token)
        .await
        .map_err(refresh_error)?;

    let access_token = state.tokens.generate_access_token(&user_id)?;
    ok(Envelope::success(json!({ "accessToken": access_token }))
        .with_message("Access token refreshed"))
}

/// DELETE /authentications
async fn logout(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult {
    let token = non_empty("refreshToken", &req.refresh_token)?;

    AuthenticationRepo::new(&state.pool)
        .delete(&token)
        .await
        .map_err(refresh_error)?;

    ok(Envelope::message("Refresh token deleted"))
}

/// Authentication routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/authentications", post(login).put(refresh).delete(logout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::{body_json, json_request, router as app};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[test]
    fn missing_refresh_token_maps_to_400() {
        let err = refresh_error(DbError::NotFound {
            resource: "refresh token",
            id: "<redacted>".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn forged_refresh_token_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request(
                "PUT",
                "/authentications",
                r#"{"refreshToken": "forged.token.value"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], BAD_REFRESH_TOKEN);
    }

    #[tokio::test]
    async fn login_requires_username() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request(
                "POST",
                "/authentications",
                r#"{"username": "", "password": "secret"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_requires_refresh_token_field() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request("DELETE", "/authentications", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
