use uuid::Uuid;

use crate::modules::file::schema::FileUsage;

/// New file metadata to insert into database
#[derive(Debug, Clone)]
pub struct NewFile {
    pub storage_key: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_by: Uuid,
    pub usage: FileUsage,
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    /// Accepted for everything except personal drive uploads.
    pub document_mime_types: Vec<String>,
}

impl UploadConfig {
    pub fn with_max_size(max_file_size: usize) -> Self {
        Self { max_file_size, ..Self::default() }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            document_mime_types: [
                "application/pdf",
                "image/jpeg",
                "image/png",
                "image/webp",
                "text/plain",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/vnd.ms-excel",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "application/vnd.ms-powerpoint",
                "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}
