use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

use crate::error::{AppError, AppResult};

use super::{key_from_path, StorageBackend};

const SCHEME: &str = "r2";

pub struct R2Backend {
    bucket: Box<Bucket>,
    bucket_name: String,
}

impl R2Backend {
    pub fn new(
        bucket_name: String,
        account_id: String,
        access_key: String,
        secret_key: String,
    ) -> AppResult<Self> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: format!("https://{}.r2.cloudflarestorage.com", account_id),
        };

        let credentials = Credentials::new(Some(&access_key), Some(&secret_key), None, None, None)
            .map_err(|e| AppError::Blob(format!("R2 credentials error: {}", e)))?;

        let bucket = Bucket::new(&bucket_name, region, credentials)
            .map_err(|e| AppError::Blob(format!("R2 bucket error: {}", e)))?;

        Ok(Self {
            bucket,
            bucket_name,
        })
    }
}

#[tonic::async_trait]
impl StorageBackend for R2Backend {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Blob(format!("R2 upload failed: {}", e)))?;

        tracing::info!("R2 upload: bucket={}, key={}, size={}", self.bucket_name, key, data.len());
        Ok(format!("{}://{}/{}", SCHEME, self.bucket_name, key))
    }

    async fn download(&self, path: &str) -> AppResult<Vec<u8>> {
        let key = self.key_of(path)?;
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| AppError::Blob(format!("R2 download failed: {}", e)))?;
        Ok(response.bytes().to_vec())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let key = self.key_of(path)?;
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Blob(format!("R2 delete failed: {}", e)))?;

        tracing::info!("R2 delete: bucket={}, key={}", self.bucket_name, key);
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket_name
    }

    fn key_of<'a>(&self, path: &'a str) -> AppResult<&'a str> {
        key_from_path(path, SCHEME, &self.bucket_name)
    }
}
