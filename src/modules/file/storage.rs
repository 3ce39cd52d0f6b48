use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::api::error;

/// Physical blob backend behind every stored file.
#[async_trait::async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Stores `bytes` and returns the adapter-specific key.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, error::SystemError>;

    async fn read(&self, key: &str) -> Result<Vec<u8>, error::SystemError>;

    /// Duplicates a blob; the returned key is independent of the source.
    async fn copy(&self, key: &str) -> Result<String, error::SystemError>;

    async fn delete(&self, key: &str) -> Result<(), error::SystemError>;
}

/// Generate unique key, keeping the original extension
pub fn generate_key(original_name: &str) -> String {
    let extension =
        Path::new(original_name).extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let uuid = Uuid::now_v7();
    if extension.is_empty() {
        uuid.to_string()
    } else {
        format!("{}.{}", uuid, extension.to_lowercase())
    }
}

/// Blobs as flat files under one directory.
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, error::SystemError> {
        if key.is_empty() || key.contains(&['/', '\\'][..]) || key.starts_with('.') {
            return Err(error::SystemError::bad_request("Invalid storage key"));
        }
        Ok(self.root.join(key))
    }
}

fn not_found_as_missing(err: std::io::Error) -> error::SystemError {
    if err.kind() == std::io::ErrorKind::NotFound {
        error::SystemError::not_found("Stored file is missing")
    } else {
        error::SystemError::IoError(err)
    }
}

#[async_trait::async_trait]
impl StorageAdapter for LocalDiskStorage {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, error::SystemError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let key = generate_key(original_name);
        tokio::fs::write(self.path_for(&key)?, bytes).await?;
        tracing::debug!("Stored blob {} ({} bytes)", key, bytes.len());

        Ok(key)
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, error::SystemError> {
        tokio::fs::read(self.path_for(key)?).await.map_err(not_found_as_missing)
    }

    async fn copy(&self, key: &str) -> Result<String, error::SystemError> {
        let new_key = generate_key(key);
        tokio::fs::copy(self.path_for(key)?, self.path_for(&new_key)?)
            .await
            .map_err(not_found_as_missing)?;
        tracing::debug!("Copied blob {} to {}", key, new_key);
        Ok(new_key)
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        tokio::fs::remove_file(self.path_for(key)?).await.map_err(not_found_as_missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempRoot(PathBuf);

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn temp_root() -> TempRoot {
        TempRoot(std::env::temp_dir().join(format!("campus-portal-{}", Uuid::now_v7())))
    }

    #[test]
    fn generated_keys_keep_the_extension() {
        assert!(generate_key("Report.PDF").ends_with(".pdf"));
        assert!(!generate_key("Makefile").contains('.'));
        assert_ne!(generate_key("a.txt"), generate_key("a.txt"));
    }

    #[tokio::test]
    async fn local_copy_survives_source_delete() {
        let root = temp_root();
        let storage = LocalDiskStorage::new(&root.0);

        let key = storage.save("notes.txt", b"hello").await.unwrap();
        let copy = storage.copy(&key).await.unwrap();
        assert_ne!(key, copy);

        storage.delete(&key).await.unwrap();
        assert!(matches!(storage.read(&key).await, Err(error::SystemError::NotFound(_))));
        assert_eq!(storage.read(&copy).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_root() {
        let root = temp_root();
        let storage = LocalDiskStorage::new(&root.0);

        assert!(matches!(storage.read("../etc/passwd").await, Err(error::SystemError::BadRequest(_))));
        assert!(matches!(storage.delete("").await, Err(error::SystemError::BadRequest(_))));
    }
}
