use crate::domain::error::Result;
use crate::domain::syllabus::{Course, Professor, School};
use crate::infrastructure::db::syllabi::SyllabusRepository;
use std::sync::Arc;

pub struct CatalogUseCase {
    repository: Arc<SyllabusRepository>,
}

impl CatalogUseCase {
    pub fn new(repository: Arc<SyllabusRepository>) -> Self {
        Self { repository }
    }

    pub async fn schools(&self) -> Result<Vec<School>> {
        self.repository.list_schools().await
    }

    pub async fn professors(&self) -> Result<Vec<Professor>> {
        self.repository.list_professors().await
    }

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.repository.list_courses().await
    }
}
