//! Playlist endpoints
//!
//! Owners manage the playlist itself; owners and collaborators manage its songs.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{PlaylistRepo, PlaylistSongRepo, PlaylistSummary, SongRepo, SongSummary};
use crate::http::envelope::{created, ok, ApiResult, Envelope};
use crate::http::extractors::{AuthUser, ValidJson};
use crate::http::server::AppState;
use crate::models::non_empty;

/// Body of POST /playlists
#[derive(Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
}

/// Body of POST and DELETE /playlists/{id}/songs
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongRequest {
    pub song_id: String,
}

/// Playlist with its songs
#[derive(Serialize)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub username: String,
    pub songs: Vec<SongSummary>,
}

impl PlaylistDetail {
    fn new(playlist: PlaylistSummary, songs: Vec<SongSummary>) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name,
            username: playlist.username,
            songs,
        }
    }
}

/// POST /playlists
async fn create_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ValidJson(req): ValidJson<CreatePlaylistRequest>,
) -> ApiResult<Value> {
    let name = non_empty("name", &req.name)?;
    let playlist_id = PlaylistRepo::new(&state.pool)
        .create(&name, &user_id)
        .await?;

    tracing::info!(playlist_id = %playlist_id, owner = %user_id, "Playlist added");
    created(Envelope::success(json!({ "playlistId": playlist_id })).with_message("Playlist added"))
}

/// GET /playlists - owned and collaborating
async fn list_playlists(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Value> {
    let playlists = PlaylistRepo::new(&state.pool)
        .list_for_user(&user_id)
        .await?;
    ok(Envelope::success(json!({ "playlists": playlists })))
}

/// DELETE /playlists/{id}
async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
) -> ApiResult {
    state.access().verify_owner(&playlist_id, &user_id).await?;
    PlaylistRepo::new(&state.pool).delete(&playlist_id).await?;

    tracing::info!(playlist_id = %playlist_id, "Playlist deleted");
    ok(Envelope::message("Playlist deleted"))
}

/// POST /playlists/{id}/songs
async fn add_song(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
    ValidJson(req): ValidJson<PlaylistSongRequest>,
) -> ApiResult {
    let song_id = non_empty("songId", &req.song_id)?;

    state.access().verify_access(&playlist_id, &user_id).await?;
    SongRepo::new(&state.pool).verify(&song_id).await?;
    PlaylistSongRepo::new(&state.pool)
        .add(&playlist_id, &song_id)
        .await?;

    tracing::debug!(playlist_id = %playlist_id, song_id = %song_id, "Song added to playlist");
    created(Envelope::message("Song added to playlist"))
}

/// GET /playlists/{id}/songs
async fn list_songs(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
) -> ApiResult<Value> {
    state.access().verify_access(&playlist_id, &user_id).await?;

    let playlist = PlaylistRepo::new(&state.pool).get(&playlist_id).await?;
    let songs = PlaylistSongRepo::new(&state.pool).list(&playlist_id).await?;

    ok(Envelope::success(
        json!({ "playlist": PlaylistDetail::new(playlist, songs) }),
    ))
}

/// DELETE /playlists/{id}/songs
async fn remove_song(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
    ValidJson(req): ValidJson<PlaylistSongRequest>,
) -> ApiResult {
    let song_id = non_empty("songId", &req.song_id)?;

    state.access().verify_access(&playlist_id, &user_id).await?;
    PlaylistSongRepo::new(&state.pool)
        .remove(&playlist_id, &song_id)
        .await?;

    ok(Envelope::message("Song removed from playlist"))
}

/// Playlist routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/playlists", post(create_playlist).get(list_playlists))
        .route("/playlists/{id}", delete(delete_playlist))
        .route(
            "/playlists/{id}/songs",
            post(add_song).get(list_songs).delete(remove_song),
        )
}
