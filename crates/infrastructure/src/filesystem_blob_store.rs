//! Directory-backed blob store for vault export backups.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::info;
use warden_application::BlobStore;
use warden_core::{AppError, AppResult};

/// Writes each blob as one file below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Creates a store rooted at `root`; the directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !key.contains('\\') => {
                Ok(self.root.join(name))
            }
            _ => Err(AppError::Validation(format!(
                "blob key '{key}' must be a plain file name"
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to create blob directory {}: {error}",
                self.root.display()
            ))
        })?;

        let size = bytes.len();
        tokio::fs::write(&path, bytes).await.map_err(|error| {
            AppError::Internal(format!("failed to write blob {}: {error}", path.display()))
        })?;

        info!(path = %path.display(), bytes = size, "stored blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use warden_application::BlobStore;
    use warden_core::AppError;

    use super::FilesystemBlobStore;

    #[tokio::test]
    async fn blob_is_written_below_a_created_root() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let root = directory.path().join("exports");
        let store = FilesystemBlobStore::new(&root);

        let result = store
            .put("vault_export_2024-03-01T12-00-00Z.json", b"archive".to_vec())
            .await;

        assert!(result.is_ok());
        let written = std::fs::read(root.join("vault_export_2024-03-01T12-00-00Z.json"))
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(written, b"archive".to_vec());
    }

    #[tokio::test]
    async fn keys_escaping_the_root_are_rejected() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = FilesystemBlobStore::new(directory.path());

        for key in ["../outside.json", "nested/file.json", "/etc/passwd", "", ".."] {
            let result = store.put(key, b"archive".to_vec()).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{key}");
        }
    }
}
