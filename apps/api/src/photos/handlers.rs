use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::photos::{photo_url, validate_photo, StoredPhoto};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub id: Uuid,
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// POST /api/v1/photos
/// Multipart body with a single `photo` file field.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoUploadResponse>), AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("photo") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((content_type, bytes));
        }
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing 'photo' field".to_string()))?;
    validate_photo(&content_type, &bytes, state.config.max_photo_bytes)?;

    let photo = StoredPhoto {
        id: Uuid::new_v4(),
        content_type,
        bytes,
    };
    let response = PhotoUploadResponse {
        id: photo.id,
        url: photo_url(photo.id),
        content_type: photo.content_type.clone(),
        size: photo.bytes.len(),
    };
    state.photos.put(photo).await?;
    info!("Stored photo {} ({} bytes)", response.id, response.size);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/photos/:id
pub async fn handle_get_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let photo = state
        .photos
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Photo {id} not found")))?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, "private, max-age=86400".to_string()),
        ],
        photo.bytes,
    )
        .into_response())
}
