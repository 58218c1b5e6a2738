//! Album cover uploads
//!
//! The multipart body is read and checked before the album lookup so an
//! oversized or non-image upload fails without touching the database.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    routing::post,
    Router,
};
use serde::Serialize;

use crate::db::AlbumRepo;
use crate::http::envelope::{created, ApiResult, Envelope};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::ValidationError;
use crate::storage::{is_image_content_type, MAX_COVER_BYTES};

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 16 * 1024;

const COVER_FIELD: &str = "cover";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLocation {
    pub file_location: String,
}

struct CoverUpload {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_cover(mut multipart: Multipart) -> Result<CoverUpload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(COVER_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !is_image_content_type(&content_type) {
            return Err(ApiError::Validation(ValidationError::InvalidFormat {
                field: "cover",
                reason: "must be an image",
            }));
        }

        let file_name = field.file_name().unwrap_or("cover").to_owned();
        let bytes = field.bytes().await?;
        if bytes.len() > MAX_COVER_BYTES {
            return Err(ApiError::PayloadTooLarge {
                max: MAX_COVER_BYTES,
            });
        }

        return Ok(CoverUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::Validation(ValidationError::Empty { field: "cover" }))
}

/// POST /albums/{id}/covers
async fn upload_cover(
    State(state): State<Arc<AppState>>,
    Path(album_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<CoverLocation> {
    let multipart = multipart.map_err(|rejection| {
        ApiError::Validation(ValidationError::Malformed(rejection.body_text()))
    })?;
    let upload = read_cover(multipart).await?;

    let albums = AlbumRepo::new(&state.pool);
    albums.verify(&album_id).await?;

    let file_name = state.storage.write(&upload.file_name, &upload.bytes).await?;
    let cover_url = state.cover_url(&file_name);
    if let Err(e) = albums.set_cover(&album_id, &cover_url).await {
        state.storage.remove(&file_name).await;
        return Err(e.into());
    }

    tracing::info!(album_id = %album_id, cover_url = %cover_url, "Cover uploaded");
    created(
        Envelope::success(CoverLocation {
            file_location: cover_url,
        })
        .with_message("Cover uploaded"),
    )
}

/// Cover upload routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/albums/{id}/covers", post(upload_cover))
        .layer(DefaultBodyLimit::max(MAX_COVER_BYTES + MULTIPART_OVERHEAD))
}
