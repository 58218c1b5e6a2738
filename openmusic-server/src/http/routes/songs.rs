//! Song endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{NewSong, SongFilter, SongRepo};
use crate::http::envelope::{created, ok, ApiResult, Envelope};
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::{non_empty, ValidationError};

/// Body of POST and PUT /songs
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPayload {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

impl TryFrom<SongPayload> for NewSong {
    type Error = ValidationError;

    fn try_from(p: SongPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            title: non_empty("title", &p.title)?,
            year: p.year,
            genre: non_empty("genre", &p.genre)?,
            performer: non_empty("performer", &p.performer)?,
            duration: p.duration,
            // An empty albumId means "no album"
            album_id: p.album_id.filter(|id| !id.trim().is_empty()),
        })
    }
}

/// Query of GET /songs
#[derive(Debug, Default, Deserialize)]
pub struct SongQuery {
    pub title: Option<String>,
    pub performer: Option<String>,
}

impl From<SongQuery> for SongFilter {
    fn from(q: SongQuery) -> Self {
        let keep = |s: String| {
            let trimmed = s.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        };
        Self {
            title: q.title.and_then(keep),
            performer: q.performer.and_then(keep),
        }
    }
}

/// POST /songs
async fn create_song(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SongPayload>,
) -> ApiResult<Value> {
    let song = NewSong::try_from(req)?;
    let song_id = SongRepo::new(&state.pool).create(&song).await?;

    tracing::info!(song_id = %song_id, "Song added");
    created(Envelope::success(json!({ "songId": song_id })).with_message("Song added"))
}

/// GET /songs?title=&performer=
async fn list_songs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Value> {
    let songs = SongRepo::new(&state.pool)
        .list(&SongFilter::from(query))
        .await?;
    ok(Envelope::success(json!({ "songs": songs })))
}

/// GET /songs/{id}
async fn get_song(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Value> {
    let song = SongRepo::new(&state.pool).get(&id).await?;
    ok(Envelope::success(json!({ "song": song })))
}

/// PUT /songs/{id}
async fn update_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<SongPayload>,
) -> ApiResult {
    let song = NewSong::try_from(req)?;
    SongRepo::new(&state.pool).update(&id, &song).await?;
    ok(Envelope::message("Song updated"))
}

/// DELETE /songs/{id}
async fn delete_song(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    SongRepo::new(&state.pool).delete(&id).await?;
    tracing::info!(song_id = %id, "Song deleted");
    ok(Envelope::message("Song deleted"))
}

/// Song routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/songs", post(create_song).get(list_songs))
        .route(
            "/songs/{id}",
            get(get_song).put(update_song).delete(delete_song),
        )
}
