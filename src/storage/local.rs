use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, AppResult};

use super::{key_from_path, StorageBackend};

const SCHEME: &str = "file";

/// Stores blobs under a directory on the local disk.
pub struct LocalBackend {
    root: PathBuf,
    root_name: String,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root_name = root.to_string_lossy().trim_end_matches('/').to_string();
        Self { root, root_name }
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::Blob(format!("invalid blob key {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[tonic::async_trait]
impl StorageBackend for LocalBackend {
    async fn upload(&self, key: &str, data: &[u8], _content_type: &str) -> AppResult<String> {
        let file = self.resolve(key)?;
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::Blob(format!("create {} failed: {}", dir.display(), e)))?;
        }
        tokio::fs::write(&file, data)
            .await
            .map_err(|e| AppError::Blob(format!("write {} failed: {}", file.display(), e)))?;

        tracing::info!("Local upload: root={}, key={}, size={}", self.root_name, key, data.len());
        Ok(format!("{}://{}/{}", SCHEME, self.root_name, key))
    }

    async fn download(&self, path: &str) -> AppResult<Vec<u8>> {
        let file = self.resolve(self.key_of(path)?)?;
        tokio::fs::read(&file)
            .await
            .map_err(|e| AppError::Blob(format!("read {} failed: {}", file.display(), e)))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let file = self.resolve(self.key_of(path)?)?;
        tokio::fs::remove_file(&file)
            .await
            .map_err(|e| AppError::Blob(format!("remove {} failed: {}", file.display(), e)))?;

        tracing::info!("Local delete: {}", file.display());
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.root_name
    }

    fn key_of<'a>(&self, path: &'a str) -> AppResult<&'a str> {
        key_from_path(path, SCHEME, &self.root_name)
    }
}
