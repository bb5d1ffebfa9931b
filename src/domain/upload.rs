use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};

pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";

/// `year` arrives either as a JSON number or as a numeric string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum YearValue {
    Number(i64),
    Text(String),
}

impl YearValue {
    fn parse(&self) -> Option<i64> {
        match self {
            YearValue::Number(year) => Some(*year),
            YearValue::Text(raw) => raw.trim().parse().ok(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, YearValue::Text(raw) if raw.trim().is_empty())
    }
}

/// Body of `POST /api/upload`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub professor_name: Option<String>,
    #[serde(default)]
    pub year: Option<YearValue>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub course_rating: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub professor_rating: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub course_rating: Option<i64>,
    pub professor_rating: Option<i64>,
    pub comment: Option<String>,
}

/// A fully validated upload, ready for the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSyllabusUpload {
    pub school_name: String,
    pub course_code: String,
    pub course_name: String,
    pub professor_name: String,
    pub year: i64,
    pub term: String,
    pub file_url: Option<String>,
    pub text_content: Option<String>,
    pub rating: Option<NewRating>,
}

impl UploadRequest {
    pub fn into_new_syllabus(self) -> Result<NewSyllabusUpload> {
        let school_name = required(&self.school_name)?;
        let course_code = required(&self.course_code)?;
        let course_name = required(&self.course_name)?;
        let professor_name = required(&self.professor_name)?;
        let term = required(&self.term)?;
        let year = match &self.year {
            None => return Err(missing_fields()),
            Some(value) if value.is_blank() => return Err(missing_fields()),
            Some(value) => value.parse().ok_or_else(|| {
                AppError::ValidationError("Year must be a whole number".to_string())
            })?,
        };

        self.validate()?;

        let comment = normalize_optional(self.notes);
        let rating = if self.course_rating.is_some()
            || self.professor_rating.is_some()
            || comment.is_some()
        {
            Some(NewRating {
                course_rating: self.course_rating,
                professor_rating: self.professor_rating,
                comment,
            })
        } else {
            None
        };

        Ok(NewSyllabusUpload {
            school_name,
            course_code,
            course_name,
            professor_name,
            year,
            term,
            file_url: normalize_optional(self.file_url),
            text_content: normalize_optional(self.text_content),
            rating,
        })
    }
}

/// Bytes received on `POST /api/upload-file`, handed to object storage as-is.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

fn required(value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(missing_fields()),
    }
}

fn missing_fields() -> AppError {
    AppError::ValidationError(MISSING_REQUIRED_FIELDS.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
