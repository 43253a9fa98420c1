use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::objects::{
        delete::DeleteObjectRequest,
        download::Range,
        get::GetObjectRequest,
        upload::{Media, UploadObjectRequest, UploadType},
    },
};

use crate::error::{AppError, AppResult};

use super::{key_from_path, StorageBackend};

const SCHEME: &str = "gs";

pub struct GcsBackend {
    client: Client,
    bucket: String,
}

impl GcsBackend {
    pub async fn new(bucket: String) -> AppResult<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| AppError::Blob(format!("GCS auth failed: {}", e)))?;
        let client = Client::new(config);
        Ok(Self { client, bucket })
    }
}

#[tonic::async_trait]
impl StorageBackend for GcsBackend {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String> {
        let mut media = Media::new(key.to_string());
        media.content_type = std::borrow::Cow::Owned(content_type.to_string());
        let upload_type = UploadType::Simple(media);

        self.client
            .upload_object(
                &UploadObjectRequest {
                    bucket: self.bucket.clone(),
                    ..Default::default()
                },
                data.to_vec(),
                &upload_type,
            )
            .await
            .map_err(|e| AppError::Blob(format!("GCS upload failed: {}", e)))?;

        tracing::info!("GCS upload: bucket={}, key={}, size={}", self.bucket, key, data.len());
        Ok(format!("{}://{}/{}", SCHEME, self.bucket, key))
    }

    async fn download(&self, path: &str) -> AppResult<Vec<u8>> {
        let key = self.key_of(path)?;
        self.client
            .download_object(
                &GetObjectRequest {
                    bucket: self.bucket.clone(),
                    object: key.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await
            .map_err(|e| AppError::Blob(format!("GCS download failed: {}", e)))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let key = self.key_of(path)?;
        self.client
            .delete_object(&DeleteObjectRequest {
                bucket: self.bucket.clone(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| AppError::Blob(format!("GCS delete failed: {}", e)))?;

        tracing::info!("GCS delete: bucket={}, key={}", self.bucket, key);
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn key_of<'a>(&self, path: &'a str) -> AppResult<&'a str> {
        key_from_path(path, SCHEME, &self.bucket)
    }
}
