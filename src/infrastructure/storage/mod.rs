pub mod cloudinary;

use crate::domain::error::Result;
use crate::domain::upload::UploadedFile;
use async_trait::async_trait;

pub use cloudinary::CloudinaryStorage;

/// Stores uploaded files and hands back a public URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, file: UploadedFile) -> Result<String>;
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use crate::domain::error::AppError;
    use std::sync::Mutex;

    /// Keeps files in memory; `failing()` rejects every upload.
    #[derive(Default)]
    pub struct MemoryStorage {
        pub files: Mutex<Vec<UploadedFile>>,
        fail: bool,
    }

    impl MemoryStorage {
        pub fn failing() -> Self {
            Self {
                files: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn stored(&self) -> usize {
            self.files.lock().map(|files| files.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn put(&self, file: UploadedFile) -> Result<String> {
            if self.fail {
                return Err(AppError::StorageError("storage offline".to_string()));
            }
            let url = format!("https://files.test/{}", file.file_name);
            self.files
                .lock()
                .map_err(|_| AppError::Internal("storage lock poisoned".to_string()))?
                .push(file);
            Ok(url)
        }
    }
}
