//! Playlist export requests
//!
//! The handler only snapshots the playlist and enqueues it; the consumer
//! process sends the email.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Router,
};
use openmusic_core::{ExportMessage, ExportedPlaylist};
use serde::Deserialize;

use crate::db::{PlaylistRepo, PlaylistSongRepo};
use crate::http::envelope::{created, ApiResult, Envelope};
use crate::http::extractors::{AuthUser, ValidJson};
use crate::http::server::AppState;
use crate::models::EmailAddress;

/// Body of POST /export/playlists/{playlistId}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub target_email: String,
}

/// POST /export/playlists/{playlistId}
async fn export_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
    ValidJson(req): ValidJson<ExportRequest>,
) -> ApiResult {
    let target = EmailAddress::new(&req.target_email)?;

    state.access().verify_access(&playlist_id, &user_id).await?;

    let playlist = PlaylistRepo::new(&state.pool).get(&playlist_id).await?;
    let songs = PlaylistSongRepo::new(&state.pool).list(&playlist_id).await?;
    let message = ExportMessage::new(
        ExportedPlaylist {
            id: playlist.id,
            name: playlist.name,
            songs: songs.into_iter().map(Into::into).collect(),
        },
        target.into_string(),
    );

    state.publisher.publish(&message).await?;

    tracing::info!(playlist_id = %playlist_id, user_id = %user_id, "Export requested");
    created(Envelope::message("Your request is queued"))
}

/// Export routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/export/playlists/{playlist_id}", post(export_playlist))
}
