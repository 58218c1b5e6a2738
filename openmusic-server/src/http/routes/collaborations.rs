//! Playlist collaboration endpoints (owner only)

use std::sync::Arc;

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::DbError;
use crate::http::envelope::{created, ok, ApiResult, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidJson};
use crate::http::server::AppState;
use crate::models::non_empty;
use crate::services::ServiceError;

/// Body of POST and DELETE /collaborations
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequest {
    pub playlist_id: String,
    pub user_id: String,
}

impl CollaborationRequest {
    fn validate(&self) -> Result<(String, String), ApiError> {
        Ok((
            non_empty("playlistId", &self.playlist_id)?,
            non_empty("userId", &self.user_id)?,
        ))
    }
}

/// POST /collaborations
async fn add_collaboration(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    ValidJson(req): ValidJson<CollaborationRequest>,
) -> ApiResult<Value> {
    let (playlist_id, user_id) = req.validate()?;

    let collaboration_id = state
        .access()
        .add_collaborator(&owner_id, &playlist_id, &user_id)
        .await?;

    created(
        Envelope::success(json!({ "collaborationId": collaboration_id }))
            .with_message("Collaboration added"),
    )
}

/// DELETE /collaborations
async fn remove_collaboration(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    ValidJson(req): ValidJson<CollaborationRequest>,
) -> ApiResult {
    let (playlist_id, user_id) = req.validate()?;

    state
        .access()
        .remove_collaborator(&owner_id, &playlist_id, &user_id)
        .await
        .map_err(|e| match e {
            // A missing collaboration is a bad request; a missing playlist stays 404
            ServiceError::Db(DbError::NotFound {
                resource: "collaboration",
                ..
            }) => ApiError::invariant("Collaboration not found"),
            other => other.into(),
        })?;

    ok(Envelope::message("Collaboration deleted"))
}

/// Collaboration routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/collaborations",
        post(add_collaboration).delete(remove_collaboration),
    )
}
