use std::sync::Arc;
use uuid::Uuid;

use crate::api::{error, success::Download};
use crate::modules::file::{
    model::{NewFile, UploadConfig},
    repository::FileRepository,
    schema::{FileEntity, FileUsage},
    storage::StorageAdapter,
};
use crate::utils::UploadedFile;

/// Blob + metadata bookkeeping shared by every module that stores files.
#[derive(Clone)]
pub struct FileService {
    file_repo: Arc<dyn FileRepository + Send + Sync>,
    storage: Arc<dyn StorageAdapter>,
    config: UploadConfig,
}

impl FileService {
    pub fn new(
        file_repo: Arc<dyn FileRepository + Send + Sync>,
        storage: Arc<dyn StorageAdapter>,
        config: UploadConfig,
    ) -> Self {
        Self { file_repo, storage, config }
    }

    /// Validate file type and size
    pub fn validate(&self, upload: &UploadedFile, usage: FileUsage) -> Result<(), error::SystemError> {
        if upload.bytes.len() > self.config.max_file_size {
            return Err(error::SystemError::bad_request(format!(
                "'{}' exceeds the maximum allowed size of {} bytes",
                upload.filename, self.config.max_file_size
            )));
        }

        if usage != FileUsage::Personal
            && !self.config.document_mime_types.iter().any(|m| m == &upload.mime_type)
        {
            return Err(error::SystemError::bad_request(format!(
                "File type '{}' is not allowed",
                upload.mime_type
            )));
        }

        Ok(())
    }

    async fn insert_or_discard(&self, new_file: NewFile) -> Result<FileEntity, error::SystemError> {
        match self.file_repo.create(&new_file).await {
            Ok(entity) => Ok(entity),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&new_file.storage_key).await {
                    tracing::warn!("Orphaned blob {}: {}", new_file.storage_key, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Stores the blob, then records it.
    pub async fn store(
        &self,
        upload: UploadedFile,
        uploaded_by: Uuid,
        usage: FileUsage,
    ) -> Result<FileEntity, error::SystemError> {
        self.validate(&upload, usage)?;

        let storage_key = self.storage.save(&upload.filename, &upload.bytes).await?;

        self.insert_or_discard(NewFile {
            storage_key,
            original_name: upload.filename,
            mime_type: upload.mime_type,
            size: upload.bytes.len() as i64,
            uploaded_by,
            usage,
        })
        .await
    }

    /// Physically copies the blob behind `source` into a new, independent File.
    pub async fn duplicate(
        &self,
        source: &FileEntity,
        owner: Uuid,
    ) -> Result<FileEntity, error::SystemError> {
        let storage_key = self.storage.copy(&source.storage_key).await?;

        self.insert_or_discard(NewFile {
            storage_key,
            original_name: source.original_name.clone(),
            mime_type: source.mime_type.clone(),
            size: source.size,
            uploaded_by: owner,
            usage: source.usage,
        })
        .await
    }

    pub async fn get(&self, file_id: &Uuid) -> Result<FileEntity, error::SystemError> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))
    }

    pub async fn read(&self, file_id: &Uuid) -> Result<(FileEntity, Vec<u8>), error::SystemError> {
        let file = self.get(file_id).await?;
        let bytes = self.storage.read(&file.storage_key).await?;
        Ok((file, bytes))
    }

    /// Blob and metadata for an attachment response, named as `filename` when given.
    pub async fn download(
        &self,
        file_id: &Uuid,
        filename: Option<String>,
    ) -> Result<Download, error::SystemError> {
        let (file, bytes) = self.read(file_id).await?;
        Ok(Download {
            filename: filename.unwrap_or(file.original_name),
            mime_type: file.mime_type,
            bytes,
        })
    }

    /// Deletes blob and row. A blob that cannot be deleted is logged and left behind.
    pub async fn remove(&self, file_id: &Uuid) -> Result<(), error::SystemError> {
        let Some(file) = self.file_repo.find_by_id(file_id).await? else {
            tracing::warn!("File {} already gone", file_id);
            return Ok(());
        };

        if let Err(e) = self.storage.delete(&file.storage_key).await {
            tracing::warn!("Failed to delete blob {} of file {}: {}", file.storage_key, file.id, e);
        }

        self.file_repo.delete(file_id).await
    }
}
