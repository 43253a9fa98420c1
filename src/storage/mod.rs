// Blob storage for evidence photos: GCS, R2 and local filesystem backends

pub mod gcs;
pub mod local;
pub mod r2;

pub use gcs::GcsBackend;
pub use local::LocalBackend;
pub use r2::R2Backend;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Object storage reachable by path.
///
/// `upload` returns a backend-qualified path (`gs://bucket/key`, ...); the
/// other operations accept such a path.
#[tonic::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stores the bytes under `key` and returns the retrievable path.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String>;

    async fn download(&self, path: &str) -> AppResult<Vec<u8>>;

    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Bucket (or root directory) name.
    fn bucket(&self) -> &str;

    /// Object key of a path issued by this backend.
    fn key_of<'a>(&self, path: &'a str) -> AppResult<&'a str>;
}

/// Object key of `path`, provided it lies under the owner's prefix on `blobs`.
///
/// Paths of another owner, of another backend or with relative segments are
/// rejected, so a record can only ever point at the owner's own uploads.
pub fn owned_key<'a>(blobs: &dyn StorageBackend, owner_id: Uuid, path: &'a str) -> AppResult<&'a str> {
    let foreign = || AppError::Validation(format!("photo path {} is not an upload of this account", path));
    let key = blobs.key_of(path.trim()).map_err(|_| foreign())?;
    let prefix = owner_id.to_string();
    match key.split_once('/') {
        Some((owner, rest))
            if owner == prefix
                && !rest.is_empty()
                && rest.split('/').all(|s| !s.is_empty() && s != "." && s != "..") =>
        {
            Ok(key)
        }
        _ => Err(foreign()),
    }
}

/// Content-addressed key: `{owner}/{sha256}.{ext}`.
pub fn photo_key(owner_id: Uuid, filename: &str, data: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(data));
    match extension(filename) {
        Some(ext) => format!("{}/{}.{}", owner_id, digest, ext),
        None => format!("{}/{}", owner_id, digest),
    }
}

fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

/// Guesses a content type from the file name when the client sent none.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Splits `scheme://bucket/key` and checks it belongs to this backend.
pub(crate) fn key_from_path<'a>(path: &'a str, scheme: &str, bucket: &str) -> AppResult<&'a str> {
    path.strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
        .and_then(|rest| rest.strip_prefix(bucket))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            AppError::Blob(format!("path {} is not in {}://{}", path, scheme, bucket))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_key_is_content_addressed() {
        let owner = Uuid::nil();
        let a = photo_key(owner, "IMG_01.JPG", b"pixels");
        let b = photo_key(owner, "other-name.jpg", b"pixels");
        assert_eq!(a, b);
        assert!(a.starts_with("00000000-0000-0000-0000-000000000000/"));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, photo_key(owner, "IMG_01.JPG", b"other pixels"));
    }

    #[test]
    fn test_photo_key_without_usable_extension() {
        let key = photo_key(Uuid::nil(), "photo", b"x");
        assert!(!key.contains('.'));
        let key = photo_key(Uuid::nil(), "photo.../etc", b"x");
        assert!(!key.ends_with("/etc"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }

    struct Fixed;

    #[tonic::async_trait]
    impl StorageBackend for Fixed {
        async fn upload(&self, key: &str, _data: &[u8], _content_type: &str) -> AppResult<String> {
            Ok(format!("gs://photos/{}", key))
        }

        async fn download(&self, _path: &str) -> AppResult<Vec<u8>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _path: &str) -> AppResult<()> {
            Ok(())
        }

        fn bucket(&self) -> &str {
            "photos"
        }

        fn key_of<'a>(&self, path: &'a str) -> AppResult<&'a str> {
            key_from_path(path, "gs", "photos")
        }
    }

    #[test]
    fn test_owned_key_accepts_only_own_prefix() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let path = format!("gs://photos/{}/abc.jpg", alice);

        assert_eq!(owned_key(&Fixed, alice, &path).unwrap(), format!("{}/abc.jpg", alice));
        assert!(matches!(owned_key(&Fixed, bob, &path), Err(AppError::Validation(_))));
        assert!(owned_key(&Fixed, alice, &format!("gs://other/{}/abc.jpg", alice)).is_err());
        assert!(owned_key(&Fixed, alice, &format!("gs://photos/{}/../{}/abc.jpg", alice, bob)).is_err());
        assert!(owned_key(&Fixed, alice, &format!("gs://photos/{}/", alice)).is_err());
        assert!(owned_key(&Fixed, alice, &format!("gs://photos/{}abc.jpg", alice)).is_err());
    }

    #[test]
    fn test_key_from_path() {
        assert_eq!(key_from_path("gs://photos/u/abc.jpg", "gs", "photos").unwrap(), "u/abc.jpg");
        assert!(key_from_path("gs://other/u/abc.jpg", "gs", "photos").is_err());
        assert!(key_from_path("r2://photos/u/abc.jpg", "gs", "photos").is_err());
        assert!(key_from_path("gs://photos/", "gs", "photos").is_err());
    }
}
