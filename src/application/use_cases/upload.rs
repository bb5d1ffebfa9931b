use crate::domain::error::Result;
use crate::domain::syllabus::Syllabus;
use crate::domain::upload::UploadRequest;
use crate::infrastructure::db::syllabi::SyllabusRepository;
use std::sync::Arc;
use tracing::info;

pub struct UploadUseCase {
    repository: Arc<SyllabusRepository>,
}

impl UploadUseCase {
    pub fn new(repository: Arc<SyllabusRepository>) -> Self {
        Self { repository }
    }

    /// Validates the request, then runs the upload transaction.
    pub async fn execute(&self, request: UploadRequest) -> Result<Syllabus> {
        let upload = request.into_new_syllabus()?;
        let syllabus = self.repository.create_upload(&upload).await?;
        info!(
            syllabus_id = %syllabus.id,
            school = %syllabus.course.school.name,
            course = %syllabus.course.course_code,
            rated = !syllabus.ratings.is_empty(),
            "Syllabus uploaded"
        );
        Ok(syllabus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::upload::{YearValue, MISSING_REQUIRED_FIELDS};
    use crate::infrastructure::db::connection::connect_in_memory;
    use sqlx::SqlitePool;

    fn request() -> UploadRequest {
        UploadRequest {
            school_name: Some("MIT".to_string()),
            course_code: Some("6.006".to_string()),
            course_name: Some("Intro to Algorithms".to_string()),
            professor_name: Some("A. Turing".to_string()),
            year: Some(YearValue::Number(2024)),
            term: Some("Fall".to_string()),
            ..UploadRequest::default()
        }
    }

    async fn setup() -> (SqlitePool, UploadUseCase) {
        let pool = connect_in_memory().await;
        let use_case = UploadUseCase::new(Arc::new(SyllabusRepository::new(pool.clone())));
        (pool, use_case)
    }

    async fn total_rows(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM schools) + (SELECT COUNT(*) FROM professors)
                  + (SELECT COUNT(*) FROM courses) + (SELECT COUNT(*) FROM syllabi)
                  + (SELECT COUNT(*) FROM ratings)",
        )
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn rated_upload_produces_one_rating() {
        let (_pool, use_case) = setup().await;
        let syllabus = use_case
            .execute(UploadRequest {
                course_rating: Some(5),
                ..request()
            })
            .await
            .unwrap();

        assert_eq!(syllabus.course.school.name, "MIT");
        assert_eq!(syllabus.year, 2024);
        assert_eq!(syllabus.term, "Fall");
        assert_eq!(syllabus.ratings.len(), 1);
        assert_eq!(syllabus.ratings[0].course_rating, Some(5));
        assert_eq!(syllabus.ratings[0].professor_rating, None);
    }

    #[tokio::test]
    async fn notes_alone_create_a_rating() {
        let (_pool, use_case) = setup().await;
        let syllabus = use_case
            .execute(UploadRequest {
                notes: Some("Heavy workload".to_string()),
                ..request()
            })
            .await
            .unwrap();
        assert_eq!(syllabus.ratings.len(), 1);
        assert_eq!(
            syllabus.ratings[0].comment.as_deref(),
            Some("Heavy workload")
        );
    }

    #[tokio::test]
    async fn missing_field_writes_nothing() {
        let (pool, use_case) = setup().await;
        let err = use_case
            .execute(UploadRequest {
                term: Some("  ".to_string()),
                ..request()
            })
            .await
            .unwrap_err();
        match err {
            AppError::ValidationError(msg) => assert_eq!(msg, MISSING_REQUIRED_FIELDS),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(total_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn out_of_range_rating_writes_nothing() {
        let (pool, use_case) = setup().await;
        let err = use_case
            .execute(UploadRequest {
                professor_rating: Some(6),
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(total_rows(&pool).await, 0);
    }
}
