//! Profile photo storage on local disk
//!
//! Photos are stored flat under the upload directory as `<uuid>.<ext>`. Only
//! names of that shape are ever read back or removed.

use std::path::{Path, PathBuf};

use common::http::ApiError;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Accepted photo content types and the extension each is stored under
const PHOTO_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/pjpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Only JPEG, PNG, GIF or WEBP images are allowed")]
    NotAnImage,

    #[error("The file name is not valid")]
    InvalidName,

    #[error("Photo not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotAnImage => ApiError::BadRequest(err.to_string()),
            UploadError::InvalidName | UploadError::NotFound => ApiError::NotFound(err.to_string()),
            UploadError::Io(e) => ApiError::internal(e),
        }
    }
}

/// Directory-backed store of uploaded photos
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

/// Extension to store an upload under, `None` when the type is not accepted
fn stored_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    PHOTO_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// A stored name is a UUID followed by a short alphanumeric extension
pub fn is_stored_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, ext)) => {
            Uuid::parse_str(stem).is_ok()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Content type served for a stored name
pub fn content_type_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, UploadError> {
        if is_stored_name(name) {
            Ok(self.root.join(name))
        } else {
            Err(UploadError::InvalidName)
        }
    }

    /// Write an image and return the name it was stored under
    ///
    /// The extension follows the declared content type; the client's file
    /// name is never used.
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let extension = stored_extension(content_type).ok_or(UploadError::NotAnImage)?;
        let name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), bytes).await?;

        info!("Stored photo {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, UploadError> {
        let path = self.path_of(name)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(UploadError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored photo; a missing file is not an error
    pub async fn remove(&self, name: &str) -> Result<(), UploadError> {
        let path = self.path_of(name)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Photo {} was already gone", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> PhotoStore {
        PhotoStore::new(std::env::temp_dir().join(format!("academy-photos-{}", Uuid::new_v4())))
    }

    #[test]
    fn extension_comes_from_content_type() {
        assert_eq!(stored_extension("image/png"), Some("png"));
        assert_eq!(stored_extension("IMAGE/JPEG"), Some("jpg"));
        assert_eq!(stored_extension("image/webp; charset=binary"), Some("webp"));
        assert_eq!(stored_extension("image/svg+xml"), None);
        assert_eq!(stored_extension("image/heic"), None);
        assert_eq!(stored_extension("text/html"), None);
    }

    #[test]
    fn only_generated_names_are_accepted() {
        let name = format!("{}.jpg", Uuid::new_v4());
        assert!(is_stored_name(&name));
        assert!(!is_stored_name("../secret.jpg"));
        assert!(!is_stored_name("photo.jpg"));
        assert!(!is_stored_name(&format!("{}", Uuid::new_v4())));
        assert!(!is_stored_name(&format!("{}.j/g", Uuid::new_v4())));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a"), "image/jpeg");
    }

    #[tokio::test]
    async fn saved_photo_can_be_read_and_removed() {
        let store = scratch_store();

        let name = store.save("image/png", b"png-bytes").await.unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(store.read(&name).await.unwrap(), b"png-bytes");

        store.remove(&name).await.unwrap();
        assert!(matches!(store.read(&name).await, Err(UploadError::NotFound)));
        store.remove(&name).await.unwrap();

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn stored_name_follows_declared_type() {
        let store = scratch_store();

        // Bytes are not sniffed; the name follows the declared type
        let name = store.save("image/png", b"<html></html>").await.unwrap();
        assert!(is_stored_name(&name));
        assert!(name.ends_with(".png"));
        assert_eq!(content_type_for(&name), "image/png");

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn non_images_and_traversal_are_rejected() {
        let store = scratch_store();

        for content_type in ["text/plain", "image/svg+xml", "text/html", ""] {
            assert!(
                matches!(store.save(content_type, b"hi").await, Err(UploadError::NotAnImage)),
                "content type {content_type:?}"
            );
        }
        assert!(matches!(
            store.read("../../etc/passwd").await,
            Err(UploadError::InvalidName)
        ));
    }
}
