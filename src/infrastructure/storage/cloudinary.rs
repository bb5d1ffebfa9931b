use super::ObjectStorage;
use crate::domain::error::{AppError, Result};
use crate::domain::upload::UploadedFile;
use crate::infrastructure::config::StorageConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

/// Unsigned raw uploads through an upload preset.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    /// `None` until a cloud name is configured; uploads then fail.
    upload_url: Option<String>,
    upload_preset: String,
}

impl CloudinaryStorage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::StorageError(format!("Failed to build HTTP client: {e}")))?;

        let upload_url = match config.cloud_name.trim() {
            "" => {
                warn!("storage.cloud_name is not configured, file uploads will fail");
                None
            }
            cloud => Some(Self::upload_url(&config.base_url, cloud)?),
        };

        Ok(Self {
            client,
            upload_url,
            upload_preset: config.upload_preset.clone(),
        })
    }

    fn upload_url(base_url: &str, cloud_name: &str) -> Result<String> {
        let cloud = cloud_name.trim();
        let base = url::Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid storage base URL: {e}")))?;
        let joined = base
            .join(&format!("v1_1/{cloud}/raw/upload"))
            .map_err(|e| AppError::ConfigError(format!("Invalid storage upload URL: {e}")))?;
        Ok(joined.to_string())
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn put(&self, file: UploadedFile) -> Result<String> {
        let upload_url = self.upload_url.as_deref().ok_or_else(|| {
            AppError::StorageError("storage.cloud_name is not configured".to_string())
        })?;
        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::StorageError(format!("Invalid content type: {e}")))?;
        }
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, body = %text, "Cloudinary rejected upload");
            return Err(AppError::StorageError(format!(
                "Upload failed ({status}): {text}"
            )));
        }

        let body: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to parse upload response: {e}")))?;

        debug!(file = %file.file_name, size, url = %body.secure_url, "Stored file");
        Ok(body.secure_url)
    }
}
