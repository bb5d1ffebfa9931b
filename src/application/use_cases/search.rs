use crate::domain::search::{SearchFilters, SearchQuery};
use crate::domain::syllabus::Syllabus;
use crate::infrastructure::db::syllabi::SyllabusRepository;
use std::sync::Arc;
use tracing::{debug, error};

pub struct SearchUseCase {
    repository: Arc<SyllabusRepository>,
}

impl SearchUseCase {
    pub fn new(repository: Arc<SyllabusRepository>) -> Self {
        Self { repository }
    }

    /// Lookup failures are logged and yield an empty list.
    pub async fn execute(&self, query: SearchQuery) -> Vec<Syllabus> {
        let filters = SearchFilters::from(query);
        match self.repository.search(&filters).await {
            Ok(results) => {
                debug!(?filters, count = results.len(), "Syllabus search");
                results
            }
            Err(e) => {
                error!(?filters, error = %e, "Syllabus search failed");
                Vec::new()
            }
        }
    }
}
