use crate::domain::error::{AppError, Result};
use crate::domain::upload::UploadedFile;
use crate::infrastructure::storage::ObjectStorage;
use std::sync::Arc;
use tracing::info;

pub const NO_FILE_PROVIDED: &str = "No file provided";
pub const FILE_TOO_LARGE: &str = "File too large";

pub struct FileIngestionUseCase {
    storage: Arc<dyn ObjectStorage>,
    max_bytes: usize,
}

impl FileIngestionUseCase {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Forwards the file untouched and returns its public URL.
    pub async fn execute(&self, file: Option<UploadedFile>) -> Result<String> {
        let file = file
            .filter(|file| !file.bytes.is_empty())
            .ok_or_else(|| AppError::ValidationError(NO_FILE_PROVIDED.to_string()))?;
        if file.bytes.len() > self.max_bytes {
            return Err(AppError::ValidationError(FILE_TOO_LARGE.to_string()));
        }

        let file_name = file.file_name.clone();
        let size = file.bytes.len();
        let url = self.storage.put(file).await?;
        info!(file = %file_name, size, url = %url, "File uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStorage;

    fn file(size: usize) -> UploadedFile {
        UploadedFile {
            file_name: "syllabus.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: vec![7; size],
        }
    }

    #[tokio::test]
    async fn stores_file_and_returns_url() {
        let storage = Arc::new(MemoryStorage::default());
        let use_case = FileIngestionUseCase::new(storage.clone(), 1024);
        let url = use_case.execute(Some(file(10))).await.unwrap();
        assert_eq!(url, "https://files.test/syllabus.pdf");
        assert_eq!(storage.stored(), 1);
    }

    #[tokio::test]
    async fn missing_or_empty_file_is_rejected() {
        let storage = Arc::new(MemoryStorage::default());
        let use_case = FileIngestionUseCase::new(storage.clone(), 1024);
        for input in [None, Some(file(0))] {
            match use_case.execute(input).await.unwrap_err() {
                AppError::ValidationError(msg) => assert_eq!(msg, NO_FILE_PROVIDED),
                other => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(storage.stored(), 0);
    }

    #[tokio::test]
    async fn oversized_file_never_reaches_storage() {
        let storage = Arc::new(MemoryStorage::default());
        let use_case = FileIngestionUseCase::new(storage.clone(), 1024);
        assert!(use_case.execute(Some(file(1024))).await.is_ok());
        match use_case.execute(Some(file(1025))).await.unwrap_err() {
            AppError::ValidationError(msg) => assert_eq!(msg, FILE_TOO_LARGE),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(storage.stored(), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_a_storage_error() {
        let use_case = FileIngestionUseCase::new(Arc::new(MemoryStorage::failing()), 1024);
        let err = use_case.execute(Some(file(10))).await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
        assert!(!err.is_client_error());
    }
}
