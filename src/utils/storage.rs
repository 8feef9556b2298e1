use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::file::{ImageUpload, StoredFile};

const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid image key '{0}'")]
    InvalidKey(String),
    #[error("Failed to build image URI: {0}")]
    Uri(#[from] url::ParseError),
    #[error("S3 request failed: {0}")]
    S3(String),
}

/// Blob storage for employee images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, upload: ImageUpload) -> Result<StoredFile, ImageStoreError>;

    /// Reads an image back. Stores that serve images elsewhere return `None`.
    async fn get(&self, key: &str) -> Result<Option<(Vec<u8>, String)>, ImageStoreError>;

    async fn remove(&self, key: &str) -> Result<(), ImageStoreError>;
}

/// Sniffs the content of an uploaded image and enforces the size limit.
pub fn inspect_image(
    file_name: Option<String>,
    bytes: Vec<u8>,
    max_bytes: usize,
) -> Result<ImageUpload, AppError> {
    if bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "image exceeds the {max_bytes} byte limit"
        )));
    }

    let file_type = infer::get(&bytes)
        .filter(|kind| ACCEPTED_IMAGE_TYPES.contains(&kind.mime_type()))
        .ok_or_else(|| {
            AppError::Validation("image must be a JPEG, PNG, GIF or WebP file".to_string())
        })?;

    Ok(ImageUpload {
        file_name,
        content_type: file_type.mime_type(),
        extension: file_type.extension(),
        bytes,
    })
}

pub(crate) fn new_key(upload: &ImageUpload) -> String {
    format!("{}.{}", Uuid::new_v4(), upload.extension)
}

/// Keys are generated as `<uuid>.<ext>`; anything else is refused so a key
/// can never name a path outside the store.
fn checked_key(key: &str) -> Result<&str, ImageStoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(key)
    } else {
        Err(ImageStoreError::InvalidKey(key.to_string()))
    }
}

fn content_type_for(key: &str) -> String {
    match key.rsplit('.').next() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Writes images to a directory and serves them under `<base>/uploads/<key>`.
pub struct LocalImageStore {
    dir: PathBuf,
    public_base: Url,
}

impl LocalImageStore {
    pub async fn new(dir: impl Into<PathBuf>, public_base: Url) -> Result<Self, ImageStoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, public_base })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, upload: ImageUpload) -> Result<StoredFile, ImageStoreError> {
        let key = new_key(&upload);
        tokio::fs::write(self.dir.join(&key), &upload.bytes).await?;
        let uri = self.public_base.join(&format!("uploads/{key}"))?;
        log::debug!("Stored image {key} ({} bytes)", upload.bytes.len());

        Ok(StoredFile {
            key,
            uri: uri.to_string(),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<(Vec<u8>, String)>, ImageStoreError> {
        let key = checked_key(key)?;
        match tokio::fs::read(self.dir.join(key)).await {
            Ok(bytes) => Ok(Some((bytes, content_type_for(key)))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), ImageStoreError> {
        let key = checked_key(key)?;
        match tokio::fs::remove_file(self.dir.join(key)).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps images in process memory.
pub struct MemoryImageStore {
    public_base: Url,
    images: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryImageStore {
    #[must_use]
    pub fn new(public_base: Url) -> Self {
        Self {
            public_base,
            images: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, upload: ImageUpload) -> Result<StoredFile, ImageStoreError> {
        let key = new_key(&upload);
        let uri = self.public_base.join(&format!("uploads/{key}"))?;
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), (upload.bytes, upload.content_type.to_string()));

        Ok(StoredFile {
            key,
            uri: uri.to_string(),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<(Vec<u8>, String)>, ImageStoreError> {
        Ok(self
            .images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), ImageStoreError> {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    fn base() -> Url {
        Url::parse("http://localhost:8080/").unwrap()
    }

    #[test]
    fn inspect_accepts_png_and_rejects_text() {
        let upload = inspect_image(Some("me.png".to_string()), PNG_BYTES.to_vec(), 1024).unwrap();
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.extension, "png");

        let err = inspect_image(None, b"hello world".to_vec(), 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn inspect_enforces_size_limit() {
        let err = inspect_image(None, PNG_BYTES.to_vec(), 4).unwrap_err();
        assert_eq!(err.to_string(), "image exceeds the 4 byte limit");
    }

    #[test]
    fn keys_with_path_segments_are_refused() {
        assert!(checked_key("0b6a.png").is_ok());
        assert!(checked_key("../secret").is_err());
        assert!(checked_key("a/b.png").is_err());
        assert!(checked_key("").is_err());
    }

    #[test_log::test(tokio::test)]
    async fn local_store_writes_reads_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().join("uploads"), base())
            .await
            .unwrap();
        let upload = inspect_image(None, PNG_BYTES.to_vec(), 1024).unwrap();

        let stored = store.put(upload).await.unwrap();
        assert!(stored.uri.starts_with("http://localhost:8080/uploads/"));
        assert!(stored.key.ends_with(".png"));

        let (bytes, content_type) = store.get(&stored.key).await.unwrap().unwrap();
        assert_eq!(bytes, PNG_BYTES);
        assert_eq!(content_type, "image/png");

        store.remove(&stored.key).await.unwrap();
        assert!(store.get(&stored.key).await.unwrap().is_none());
        store.remove(&stored.key).await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn memory_store_tracks_images() {
        let store = MemoryImageStore::new(base());
        let upload = inspect_image(None, PNG_BYTES.to_vec(), 1024).unwrap();

        let stored = store.put(upload).await.unwrap();
        assert_eq!(store.len(), 1);

        store.remove(&stored.key).await.unwrap();
        assert!(store.is_empty());
    }
}
