use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::photos::{PhotoStore, StoredPhoto};

pub struct S3PhotoStore {
    client: S3Client,
    bucket: String,
}

impl S3PhotoStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

pub fn photo_key(id: Uuid) -> String {
    format!("photos/{id}")
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn put(&self, photo: StoredPhoto) -> Result<(), AppError> {
        let key = photo_key(photo.id);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(photo.bytes))
            .content_type(photo.content_type)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload failed: {e}")))?;

        info!("Uploaded photo to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredPhoto>, AppError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(photo_key(id))
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    return Ok(None);
                }
                return Err(AppError::S3(format!("download failed: {service_error}")));
            }
        };

        let content_type = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::S3(format!("reading photo body failed: {e}")))?
            .into_bytes();

        Ok(Some(StoredPhoto {
            id,
            content_type,
            bytes,
        }))
    }
}
