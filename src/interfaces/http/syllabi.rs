use super::response::{failure, success_data};
use super::HttpState;
use crate::application::use_cases::file_ingestion::{FILE_TOO_LARGE, NO_FILE_PROVIDED};
use crate::domain::search::SearchQuery;
use crate::domain::upload::{UploadRequest, UploadedFile};
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::MultipartForm;
use actix_multipart::MultipartError;
use actix_web::error::{InternalError, PayloadError};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use tracing::info;

#[derive(MultipartForm)]
pub struct FileUploadForm {
    pub file: Option<Bytes>,
}

#[get("/search")]
async fn search(data: web::Data<HttpState>, query: web::Query<SearchQuery>) -> impl Responder {
    let results = data.search_use_case.execute(query.into_inner()).await;
    HttpResponse::Ok().json(results)
}

#[post("/upload")]
async fn upload(data: web::Data<HttpState>, req: web::Json<UploadRequest>) -> impl Responder {
    match data.upload_use_case.execute(req.into_inner()).await {
        Ok(syllabus) => success_data(&syllabus),
        Err(e) => failure(&e, "Failed to upload syllabus"),
    }
}

#[post("/upload-file")]
async fn upload_file(
    data: web::Data<HttpState>,
    MultipartForm(form): MultipartForm<FileUploadForm>,
) -> impl Responder {
    let file = form.file.map(|file| UploadedFile {
        file_name: file.file_name.unwrap_or_else(|| "upload".to_string()),
        content_type: file.content_type.map(|mime| mime.to_string()),
        bytes: file.data.to_vec(),
    });

    match data.file_ingestion_use_case.execute(file).await {
        Ok(url) => HttpResponse::Ok().json(json!({ "success": true, "url": url })),
        Err(e) => failure(&e, "Error uploading file"),
    }
}

/// Rejections raised while reading the multipart body, before the handler runs.
pub fn multipart_error(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    let message = match err {
        MultipartError::Payload(PayloadError::Overflow) => FILE_TOO_LARGE,
        _ => NO_FILE_PROVIDED,
    };
    info!(error = %err, "Rejected multipart upload");
    let response = HttpResponse::BadRequest().json(json!({ "success": false, "error": message }));
    InternalError::from_response(err, response).into()
}
