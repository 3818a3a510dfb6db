//! Uploaded files on the local filesystem.
//!
//! Files live under `<root>/<collection>/<uuid>_<name>`. The database keeps
//! the path relative to the root so the upload directory can move.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use edu_core::entities::ResourceKind;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Stored file is missing: {0}")]
    Missing(String),

    #[error("Invalid stored path: {0}")]
    InvalidPath(String),

    #[error("File storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Relative to the storage root
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` for a sanitized file name and return where it went
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(
        &self,
        kind: ResourceKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let relative = format!(
            "{}/{}_{file_name}",
            kind.collection(),
            uuid::Uuid::new_v4().simple()
        );
        let full = self.resolve(&relative)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        debug!(path = %relative, "Stored upload");
        Ok(StoredFile {
            path: relative,
            size: bytes.len() as u64,
        })
    }

    pub async fn read(&self, relative: &str) -> Result<Vec<u8>, StorageError> {
        let full = self.resolve(relative)?;
        tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::Missing(relative.to_string()),
            _ => StorageError::Io(e),
        })
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), StorageError> {
        let full = self.resolve(relative)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        let clean = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> FileStorage {
        let dir = std::env::temp_dir().join(format!("edu-storage-{}", uuid::Uuid::new_v4().simple()));
        FileStorage::new(dir)
    }

    #[tokio::test]
    async fn test_save_read_remove() {
        let storage = temp_storage();
        let stored = storage
            .save(ResourceKind::Note, "unit1.pdf", b"%PDF-1.4")
            .await
            .unwrap();

        assert!(stored.path.starts_with("notes/"));
        assert!(stored.path.ends_with("_unit1.pdf"));
        assert_eq!(stored.size, 8);
        assert_eq!(storage.read(&stored.path).await.unwrap(), b"%PDF-1.4");

        storage.remove(&stored.path).await.unwrap();
        assert!(matches!(
            storage.read(&stored.path).await,
            Err(StorageError::Missing(_))
        ));
        // Second removal is a no-op
        storage.remove(&stored.path).await.unwrap();

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_same_name_does_not_collide() {
        let storage = temp_storage();
        let a = storage.save(ResourceKind::Paper, "os.pdf", b"a").await.unwrap();
        let b = storage.save(ResourceKind::Paper, "os.pdf", b"b").await.unwrap();
        assert_ne!(a.path, b.path);
        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[test]
    fn test_traversal_rejected() {
        let storage = FileStorage::new("/srv/uploads");
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert_eq!(
            storage.resolve("notes/a.pdf").unwrap(),
            PathBuf::from("/srv/uploads/notes/a.pdf")
        );
    }
}
