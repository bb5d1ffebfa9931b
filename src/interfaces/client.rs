//! HTTP client for the syllabus API, driven by the form state in
//! [`crate::domain::forms`].

use crate::domain::error::{AppError, Result};
use crate::domain::forms::{SearchForm, UploadForm, UploadType};
use crate::domain::syllabus::Syllabus;
use crate::domain::upload::{UploadRequest, UploadedFile};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    url: Option<String>,
    error: Option<String>,
}

pub struct SyllabusClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl SyllabusClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid API base URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub async fn search(&self, form: &SearchForm) -> Result<Vec<Syllabus>> {
        let response = self
            .client
            .get(self.endpoint("api/search")?)
            .query(&form.query_pairs())
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, None));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse search response: {e}")))
    }

    pub async fn upload_file(&self, file: UploadedFile) -> Result<String> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|_| AppError::ValidationError("Invalid file content type".to_string()))?;
        }

        let response = self
            .client
            .post(self.endpoint("api/upload-file")?)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("File upload request failed: {e}")))?;

        let envelope: Envelope<serde_json::Value> = read_envelope(response).await?;
        envelope
            .url
            .ok_or_else(|| AppError::StorageError("Upload response carried no URL".to_string()))
    }

    pub async fn upload(&self, request: &UploadRequest) -> Result<Syllabus> {
        let response = self
            .client
            .post(self.endpoint("api/upload")?)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Upload request failed: {e}")))?;

        let envelope: Envelope<Syllabus> = read_envelope(response).await?;
        envelope
            .data
            .ok_or_else(|| AppError::Internal("Upload response carried no syllabus".to_string()))
    }

    /// Validates the form, uploads the file (if any) and only then posts the
    /// syllabus. A failed file upload aborts the submission.
    pub async fn submit_upload(
        &self,
        form: &UploadForm,
        file: Option<UploadedFile>,
    ) -> Result<Syllabus> {
        if let Err(errors) = form.validate() {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::ValidationError(message));
        }

        let file_url = match form.upload_type {
            UploadType::Text => None,
            UploadType::File => {
                let file = file
                    .ok_or_else(|| AppError::ValidationError("Please choose a file".to_string()))?;
                let url = self.upload_file(file).await?;
                debug!(url = %url, "Syllabus file uploaded");
                Some(url)
            }
        };

        self.upload(&form.to_request(file_url)).await
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::ConfigError(format!("Invalid API path {path}: {e}")))
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
    let status = response.status();
    let envelope: Option<Envelope<T>> = response.json().await.ok();
    match envelope {
        Some(envelope) if status.is_success() && envelope.success => Ok(envelope),
        Some(envelope) => Err(api_error(status, envelope.error)),
        None => Err(api_error(status, None)),
    }
}

fn api_error(status: StatusCode, message: Option<String>) -> AppError {
    let message = message.unwrap_or_else(|| format!("Request failed ({status})"));
    match status {
        StatusCode::BAD_REQUEST => AppError::ValidationError(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Internal(message),
    }
}
