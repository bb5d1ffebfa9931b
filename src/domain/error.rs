use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    Conflict(String),
    Unauthorized(String),
    TokenError(TokenErrorKind),
    DatabaseError(String),
    StorageError(String),
    MailError(String),
    ConfigError(String),
    IoError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorKind {
    MissingFields,
    Invalid,
    Expired,
}

impl TokenErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            TokenErrorKind::MissingFields => "missing_fields",
            TokenErrorKind::Invalid => "invalid_token",
            TokenErrorKind::Expired => "expired_token",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::TokenError(kind) => write!(f, "Token error: {}", kind.code()),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::MailError(msg) => write!(f, "Mail error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Message safe to hand back to a client. Server-side failures collapse to
    /// the caller-supplied generic text so no storage detail leaks out.
    pub fn client_message(&self, generic: &str) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::TokenError(TokenErrorKind::MissingFields) => {
                "Token and password are required".to_string()
            }
            AppError::TokenError(TokenErrorKind::Expired) => "Reset token has expired".to_string(),
            AppError::TokenError(TokenErrorKind::Invalid) => {
                "Invalid or expired reset token".to_string()
            }
            _ => generic.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::Conflict(_)
                | AppError::Unauthorized(_)
                | AppError::NotFound(_)
                | AppError::TokenError(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_hide_details_from_clients() {
        let err = AppError::DatabaseError("UNIQUE constraint failed: users.email".to_string());
        assert_eq!(
            err.client_message("Failed to create account"),
            "Failed to create account"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn validation_errors_pass_through() {
        let err = AppError::ValidationError("Missing required fields".to_string());
        assert_eq!(err.client_message("ignored"), "Missing required fields");
        assert!(err.is_client_error());
    }

    #[test]
    fn token_error_codes() {
        assert_eq!(TokenErrorKind::MissingFields.code(), "missing_fields");
        assert_eq!(TokenErrorKind::Invalid.code(), "invalid_token");
        assert_eq!(TokenErrorKind::Expired.code(), "expired_token");
    }
}
