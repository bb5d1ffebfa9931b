use crate::domain::error::AppError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;
use tracing::error;

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) | AppError::Conflict(_) | AppError::TokenError(_) => {
            StatusCode::BAD_REQUEST
        }
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ success: true, data }`
pub fn success_data<T: Serialize>(data: &T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}

/// `{ success: true, message }`
pub fn success_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": message }))
}

pub fn failure_body(message: &str, code: Option<&str>) -> serde_json::Value {
    let mut body = json!({ "success": false, "error": message });
    if let Some(code) = code {
        body["code"] = json!(code);
    }
    body
}

/// Maps an error to its status and `{ success: false, error, code? }` body.
/// Server-side failures are logged and answered with `generic`.
pub fn failure(err: &AppError, generic: &str) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, "{generic}");
    }
    let code = match err {
        AppError::TokenError(kind) => Some(kind.code()),
        _ => None,
    };
    HttpResponse::build(status).json(failure_body(&err.client_message(generic), code))
}
