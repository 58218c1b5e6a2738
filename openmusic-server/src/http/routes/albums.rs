//! Album endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{Album, AlbumRepo, SongRepo, SongSummary};
use crate::http::envelope::{created, ok, ApiResult, Envelope};
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::{non_empty, ValidationError};

/// Body of POST and PUT /albums
#[derive(Deserialize)]
pub struct AlbumPayload {
    pub name: String,
    pub year: i32,
}

impl AlbumPayload {
    fn validate(self) -> Result<(String, i32), ValidationError> {
        Ok((non_empty("name", &self.name)?, self.year))
    }
}

/// Album with its songs
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
    pub songs: Vec<SongSummary>,
}

impl AlbumResponse {
    fn new(album: Album, songs: Vec<SongSummary>) -> Self {
        Self {
            id: album.id,
            name: album.name,
            year: album.year,
            cover_url: album.cover_url,
            songs,
        }
    }
}

/// POST /albums
async fn create_album(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<AlbumPayload>,
) -> ApiResult<Value> {
    let (name, year) = req.validate()?;
    let album_id = AlbumRepo::new(&state.pool).create(&name, year).await?;

    tracing::info!(album_id = %album_id, "Album added");
    created(Envelope::success(json!({ "albumId": album_id })).with_message("Album added"))
}

/// GET /albums/{id}
async fn get_album(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Value> {
    let album = AlbumRepo::new(&state.pool).get(&id).await?;
    let songs = SongRepo::new(&state.pool).list_by_album(&id).await?;

    ok(Envelope::success(
        json!({ "album": AlbumResponse::new(album, songs) }),
    ))
}

/// PUT /albums/{id}
async fn update_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<AlbumPayload>,
) -> ApiResult {
    let (name, year) = req.validate()?;
    AlbumRepo::new(&state.pool).update(&id, &name, year).await?;
    ok(Envelope::message("Album updated"))
}

/// DELETE /albums/{id}
async fn delete_album(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    AlbumRepo::new(&state.pool).delete(&id).await?;
    tracing::info!(album_id = %id, "Album deleted");
    ok(Envelope::message("Album deleted"))
}

/// Album routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/albums", post(create_album))
        .route(
            "/albums/{id}",
            get(get_album).put(update_album).delete(delete_album),
        )
}
