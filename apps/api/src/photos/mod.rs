//! Profile photos: upload validation and storage.
//!
//! Photos are stored once and referenced from the form by id; the preview
//! points its `<img>` at `GET /api/v1/photos/:id`.

pub mod handlers;
pub mod s3_store;

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;

pub use s3_store::S3PhotoStore;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

static PHOTO_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^image/(jpeg|jpg|png|gif)$").unwrap());

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhotoError {
    #[error("Photo file size must be less than 2MB")]
    TooLarge { size: usize, limit: usize },

    #[error("Photo must be in JPG, PNG, or GIF format")]
    UnsupportedType(String),

    #[error("Photo is empty")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub id: Uuid,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Checks size, declared type, and that the bytes really are an image of an
/// accepted format.
pub fn validate_photo(content_type: &str, bytes: &[u8], max_bytes: usize) -> Result<(), PhotoError> {
    if bytes.is_empty() {
        return Err(PhotoError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(PhotoError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    if !PHOTO_TYPE_RE.is_match(content_type) {
        return Err(PhotoError::UnsupportedType(content_type.to_string()));
    }
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::Gif) => Ok(()),
        _ => Err(PhotoError::UnsupportedType(content_type.to_string())),
    }
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn put(&self, photo: StoredPhoto) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<StoredPhoto>, AppError>;
}

/// In-process photo store for local runs without S3.
#[derive(Default)]
pub struct MemoryPhotoStore {
    photos: RwLock<HashMap<Uuid, StoredPhoto>>,
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn put(&self, photo: StoredPhoto) -> Result<(), AppError> {
        self.photos.write().await.insert(photo.id, photo);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredPhoto>, AppError> {
        Ok(self.photos.read().await.get(&id).cloned())
    }
}

pub fn photo_url(id: Uuid) -> String {
    format!("/api/v1/photos/{id}")
}
