use serde::{Deserialize, Serialize};

/// Raw query-string parameters of `GET /api/search`.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct SearchQuery {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub professor: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    Any,
    Exact(i64),
    /// A year was supplied but is not an integer; nothing can match it.
    Unmatchable,
}

/// Normalized filters: blank text is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub school: Option<String>,
    pub course: Option<String>,
    pub professor: Option<String>,
    pub year: YearFilter,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            school: None,
            course: None,
            professor: None,
            year: YearFilter::Any,
        }
    }
}

impl From<SearchQuery> for SearchFilters {
    fn from(query: SearchQuery) -> Self {
        let year = match normalize_optional(query.year) {
            None => YearFilter::Any,
            Some(raw) => match raw.parse::<i64>() {
                Ok(year) => YearFilter::Exact(year),
                Err(_) => YearFilter::Unmatchable,
            },
        };

        Self {
            school: normalize_optional(query.school),
            course: normalize_optional(query.course),
            professor: normalize_optional(query.professor),
            year,
        }
    }
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
