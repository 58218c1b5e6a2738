//! Album cover storage on the local filesystem
//!
//! Files are served back by the router under `/upload/images/`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

/// Largest accepted cover image
pub const MAX_COVER_BYTES: usize = 512_000;

/// Content types accepted for covers
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/apng",
    "image/avif",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/webp",
];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CoverStorage {
    dir: PathBuf,
}

impl CoverStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a unique name derived from `original_name`.
    ///
    /// Returns the stored file name (not the full path).
    pub async fn write(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Write {
                path: self.dir.clone(),
                source,
            })?;

        let file_name = stored_name(original_name);
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Write { path, source })?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Stored cover");
        Ok(file_name)
    }

    /// Delete a stored cover. Failures are logged since the caller is
    /// already handling another error.
    pub async fn remove(&self, file_name: &str) {
        let path = self.dir.join(file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(error = %e, path = ?path, "Failed to remove stored cover");
        }
    }
}

/// `{millis}-{8 hex chars}-{sanitized client name}`
fn stored_name(original_name: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &nonce[..8],
        sanitize_file_name(original_name)
    )
}

pub fn is_image_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    IMAGE_CONTENT_TYPES.contains(&essence.as_str())
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` so client names cannot escape the upload directory.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cover");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "cover".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_image_types_only() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("IMAGE/JPEG"));
        assert!(is_image_content_type("image/webp; charset=binary"));
        assert!(!is_image_content_type("text/plain"));
        assert!(!is_image_content_type("image/svg+xml"));
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("cover.png"), "cover.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my cover (1).jpg"), "my_cover__1_.jpg");
        assert_eq!(sanitize_file_name(".."), "cover");
        assert_eq!(sanitize_file_name(""), "cover");
    }

    #[test]
    fn same_client_name_never_collides() {
        let first = stored_name("cover.png");
        let second = stored_name("cover.png");
        assert_ne!(first, second);
        assert!(first.ends_with("-cover.png"));
    }

    #[tokio::test]
    async fn remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path());

        let name = storage.write("cover.png", b"\x89PNG").await.unwrap();
        storage.remove(&name).await;
        assert!(!storage.dir().join(&name).exists());

        // Removing again only logs.
        storage.remove(&name).await;
    }

    #[tokio::test]
    async fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path().join("images"));

        let name = storage.write("cover.png", b"\x89PNG").await.unwrap();
        assert!(name.ends_with("cover.png"));

        let stored = std::fs::read(storage.dir().join(&name)).unwrap();
        assert_eq!(stored, b"\x89PNG");
    }
}
