//! Album like endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::http::envelope::{created, ApiResult, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::services::LikeToggle;

/// Reports whether a like count came from the cache or the database
pub static DATA_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-data-source");

/// POST /albums/{id}/likes - like, or unlike when already liked
async fn toggle_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(album_id): Path<String>,
) -> ApiResult {
    let message = match state.likes().toggle_like(&user_id, &album_id).await? {
        LikeToggle::Liked { .. } => "Album liked",
        LikeToggle::Unliked => "Album unliked",
    };
    created(Envelope::message(message))
}

/// GET /albums/{id}/likes
async fn get_likes(
    State(state): State<Arc<AppState>>,
    Path(album_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let likes = state.likes().likes_count(&album_id).await?;

    Ok((
        StatusCode::OK,
        [(DATA_SOURCE_HEADER.clone(), likes.source.as_str())],
        Json(Envelope::success(json!({ "likes": likes.count }))),
    ))
}

/// Like routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/albums/{id}/likes", post(toggle_like).get(get_likes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::album_likes_key;
    use crate::http::server::{build_router, ServerConfig};
    use crate::http::test_support::{self, body_json};
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    #[tokio::test]
    async fn cached_count_sets_header() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_support::state(dir.path()));
        state
            .cache
            .set(&album_likes_key("album-1"), "3", Duration::from_secs(60))
            .await
            .unwrap();

        let response = build_router(state, &ServerConfig::default())
            .oneshot(
                Request::get("/albums/album-1/likes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-data-source"], "cache");
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["likes"], 3);
    }

    #[tokio::test]
    async fn liking_requires_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_support::router(dir.path())
            .oneshot(
                Request::post("/albums/album-1/likes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["status"], "fail");
    }

    #[tokio::test]
    async fn forged_token_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_support::router(dir.path())
            .oneshot(
                Request::post("/albums/album-1/likes")
                    .header("authorization", "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
