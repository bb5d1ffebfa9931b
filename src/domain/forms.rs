//! Client-side form state for the search bar and the upload modal.
//!
//! Each form is a plain serializable struct with a synchronous `validate`
//! that reports every field problem at once, so a view can render them
//! next to the inputs before any request is made.

use serde::{Deserialize, Serialize};

use crate::domain::upload::{UploadRequest, YearValue};

pub const TERMS: [&str; 4] = ["Fall", "Winter", "Spring", "Summer"];
pub const EARLIEST_YEAR: i64 = 2000;
pub const MAX_CLIENT_FILE_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];
const ALLOWED_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Years offered in the upload form, newest first.
pub fn year_options(current_year: i64) -> Vec<i64> {
    if current_year < EARLIEST_YEAR {
        return Vec::new();
    }
    (EARLIEST_YEAR..=current_year).rev().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    pub school: String,
    pub course: String,
    pub professor: String,
    pub year: String,
}

impl SearchForm {
    /// Query pairs for `GET /api/search`; blank inputs are dropped.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("school", &self.school),
            ("course", &self.course),
            ("professor", &self.professor),
            ("year", &self.year),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| (key, trimmed.to_string()))
        })
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadType {
    #[default]
    Text,
    File,
}

/// Metadata of the file picked in the upload modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSelection {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

impl FileSelection {
    pub fn validate(&self) -> std::result::Result<(), FieldError> {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let type_ok = self
            .content_type
            .as_deref()
            .map(|ct| ALLOWED_CONTENT_TYPES.contains(&ct))
            .unwrap_or(false);
        if !type_ok && !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(FieldError::new("file", "Please upload a PDF, DOC, or DOCX file"));
        }
        if self.size > MAX_CLIENT_FILE_BYTES {
            return Err(FieldError::new("file", "File size must be less than 10MB"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    pub school_name: String,
    pub course_code: String,
    pub course_name: String,
    pub professor_name: String,
    pub year: i64,
    pub term: String,
    pub upload_type: UploadType,
    pub text_content: String,
    pub file: Option<FileSelection>,
    pub course_rating: Option<i64>,
    pub professor_rating: Option<i64>,
    pub notes: String,
}

impl UploadForm {
    pub fn new(current_year: i64) -> Self {
        Self {
            school_name: String::new(),
            course_code: String::new(),
            course_name: String::new(),
            professor_name: String::new(),
            year: current_year,
            term: TERMS[0].to_string(),
            upload_type: UploadType::Text,
            text_content: String::new(),
            file: None,
            course_rating: None,
            professor_rating: None,
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        for (field, value, message) in [
            ("schoolName", &self.school_name, "School is required"),
            ("courseCode", &self.course_code, "Course code is required"),
            ("courseName", &self.course_name, "Course name is required"),
            ("professorName", &self.professor_name, "Professor is required"),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, message));
            }
        }

        if self.year < EARLIEST_YEAR {
            errors.push(FieldError::new("year", "Please pick a year from the list"));
        }
        if !TERMS.contains(&self.term.as_str()) {
            errors.push(FieldError::new("term", "Please pick a term from the list"));
        }

        match self.upload_type {
            UploadType::Text => {
                if self.text_content.trim().is_empty() {
                    errors.push(FieldError::new("textContent", "Syllabus text is required"));
                }
            }
            UploadType::File => match &self.file {
                None => errors.push(FieldError::new("file", "Please choose a file")),
                Some(file) => {
                    if let Err(err) = file.validate() {
                        errors.push(err);
                    }
                }
            },
        }

        for (field, rating) in [
            ("courseRating", self.course_rating),
            ("professorRating", self.professor_rating),
        ] {
            if let Some(value) = rating {
                if !(1..=5).contains(&value) {
                    errors.push(FieldError::new(field, "Ratings go from 1 to 5"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Builds the `POST /api/upload` body. `file_url` is the URL returned by
    /// the file upload, if the form carries a file.
    pub fn to_request(&self, file_url: Option<String>) -> UploadRequest {
        let text_content = match self.upload_type {
            UploadType::Text => non_blank(&self.text_content),
            UploadType::File => None,
        };
        UploadRequest {
            school_name: non_blank(&self.school_name),
            course_code: non_blank(&self.course_code),
            course_name: non_blank(&self.course_name),
            professor_name: non_blank(&self.professor_name),
            year: Some(YearValue::Number(self.year)),
            term: non_blank(&self.term),
            file_url,
            text_content,
            course_rating: self.course_rating,
            professor_rating: self.professor_rating,
            notes: non_blank(&self.notes),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
