use crate::domain::error::{AppError, Result};
use crate::domain::search::{SearchFilters, YearFilter};
use crate::domain::syllabus::{Course, Professor, Rating, School, Syllabus};
use crate::domain::upload::NewSyllabusUpload;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use std::collections::HashMap;
use uuid::Uuid;

const SYLLABUS_SELECT: &str = "SELECT s.id, s.year, s.term, s.file_url, s.text_content, s.created_at,
        c.id AS course_id, c.name AS course_name, c.course_code,
        sc.id AS school_id, sc.name AS school_name,
        p.id AS professor_id, p.name AS professor_name
     FROM syllabi s
     JOIN courses c ON c.id = s.course_id
     JOIN schools sc ON sc.id = c.school_id
     JOIN professors p ON p.id = s.professor_id";

// Keeps `IN (...)` lists well below SQLite's bound-parameter limit.
const RATING_BATCH: usize = 500;

pub struct SyllabusRepository {
    pool: SqlitePool,
}

impl SyllabusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Syllabi matching every supplied filter, newest first.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Syllabus>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SYLLABUS_SELECT);
        qb.push(" WHERE 1 = 1");

        if let Some(school) = &filters.school {
            qb.push(" AND instr(lower(sc.name), lower(")
                .push_bind(school.clone())
                .push(")) > 0");
        }
        if let Some(course) = &filters.course {
            qb.push(" AND (instr(lower(c.name), lower(")
                .push_bind(course.clone())
                .push(")) > 0 OR instr(lower(c.course_code), lower(")
                .push_bind(course.clone())
                .push(")) > 0)");
        }
        if let Some(professor) = &filters.professor {
            qb.push(" AND instr(lower(p.name), lower(")
                .push_bind(professor.clone())
                .push(")) > 0");
        }
        match filters.year {
            YearFilter::Any => {}
            YearFilter::Exact(year) => {
                qb.push(" AND s.year = ").push_bind(year);
            }
            YearFilter::Unmatchable => {
                qb.push(" AND 1 = 0");
            }
        }
        qb.push(" ORDER BY s.created_at DESC, s.rowid DESC");

        let rows = qb
            .build_query_as::<SyllabusRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to search syllabi: {e}")))?;

        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to acquire connection: {e}")))?;
        let mut ratings = load_ratings(&mut *conn, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let row_ratings = ratings.remove(&row.id).unwrap_or_default();
                row.into_syllabus(row_ratings)
            })
            .collect())
    }

    /// Runs the whole upload in one transaction: school, professor and course
    /// upserts, the syllabus insert, the optional rating, and the re-read.
    pub async fn create_upload(&self, upload: &NewSyllabusUpload) -> Result<Syllabus> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start upload tx: {e}")))?;

        let school_id = sqlx::query_scalar::<_, String>(
            "INSERT INTO schools (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET name = excluded.name
             RETURNING id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&upload.school_name)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to upsert school: {e}")))?;

        let professor_id = sqlx::query_scalar::<_, String>(
            "INSERT INTO professors (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET name = excluded.name
             RETURNING id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&upload.professor_name)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to upsert professor: {e}")))?;

        let course_id = sqlx::query_scalar::<_, String>(
            "INSERT INTO courses (id, course_code, name, school_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(school_id, course_code)
             DO UPDATE SET name = excluded.name, updated_at = excluded.updated_at
             RETURNING id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&upload.course_code)
        .bind(&upload.course_name)
        .bind(&school_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to upsert course: {e}")))?;

        let syllabus_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO syllabi (id, year, term, file_url, text_content, course_id, professor_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&syllabus_id)
        .bind(upload.year)
        .bind(&upload.term)
        .bind(&upload.file_url)
        .bind(&upload.text_content)
        .bind(&course_id)
        .bind(&professor_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert syllabus: {e}")))?;

        if let Some(rating) = &upload.rating {
            sqlx::query(
                "INSERT INTO ratings (id, course_rating, professor_rating, comment, syllabus_id, professor_id, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(rating.course_rating)
            .bind(rating.professor_rating)
            .bind(&rating.comment)
            .bind(&syllabus_id)
            .bind(&professor_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert rating: {e}")))?;
        }

        let row = sqlx::query_as::<_, SyllabusRow>(&format!("{SYLLABUS_SELECT} WHERE s.id = ?"))
            .bind(&syllabus_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to re-read syllabus: {e}")))?
            .ok_or_else(|| {
                AppError::DatabaseError(format!(
                    "Syllabus vanished inside upload tx: {syllabus_id}"
                ))
            })?;
        let mut ratings = load_ratings(&mut *tx, std::slice::from_ref(&syllabus_id)).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit upload tx: {e}")))?;

        Ok(row.into_syllabus(ratings.remove(&syllabus_id).unwrap_or_default()))
    }

    pub async fn list_schools(&self) -> Result<Vec<School>> {
        let schools =
            sqlx::query_as::<_, NamedEntity>("SELECT id, name FROM schools ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to list schools: {e}")))?;

        Ok(schools
            .into_iter()
            .map(|e| School {
                id: e.id,
                name: e.name,
            })
            .collect())
    }

    pub async fn list_professors(&self) -> Result<Vec<Professor>> {
        let professors =
            sqlx::query_as::<_, NamedEntity>("SELECT id, name FROM professors ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to list professors: {e}")))?;

        Ok(professors
            .into_iter()
            .map(|e| Professor {
                id: e.id,
                name: e.name,
            })
            .collect())
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, CourseEntity>(
            "SELECT c.id, c.name, c.course_code, sc.id AS school_id, sc.name AS school_name
             FROM courses c JOIN schools sc ON sc.id = c.school_id
             ORDER BY sc.name ASC, c.course_code ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list courses: {e}")))?;

        Ok(courses.into_iter().map(|course| course.into()).collect())
    }
}

async fn load_ratings(
    conn: &mut SqliteConnection,
    syllabus_ids: &[String],
) -> Result<HashMap<String, Vec<Rating>>> {
    let mut by_syllabus: HashMap<String, Vec<Rating>> = HashMap::new();
    for batch in syllabus_ids.chunks(RATING_BATCH) {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, syllabus_id, course_rating, professor_rating, comment, created_at
             FROM ratings WHERE syllabus_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in batch {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(") ORDER BY created_at ASC, rowid ASC");

        let rows = qb
            .build_query_as::<RatingEntity>()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load ratings: {e}")))?;

        for row in rows {
            by_syllabus
                .entry(row.syllabus_id.clone())
                .or_default()
                .push(row.into());
        }
    }
    Ok(by_syllabus)
}

#[derive(sqlx::FromRow)]
struct SyllabusRow {
    id: String,
    year: i64,
    term: String,
    file_url: Option<String>,
    text_content: Option<String>,
    created_at: i64,
    course_id: String,
    course_name: String,
    course_code: String,
    school_id: String,
    school_name: String,
    professor_id: String,
    professor_name: String,
}

impl SyllabusRow {
    fn into_syllabus(self, ratings: Vec<Rating>) -> Syllabus {
        Syllabus {
            id: self.id,
            year: self.year,
            term: self.term,
            file_url: self.file_url,
            text_content: self.text_content,
            created_at: self.created_at,
            course: Course {
                id: self.course_id,
                name: self.course_name,
                course_code: self.course_code,
                school: School {
                    id: self.school_id,
                    name: self.school_name,
                },
            },
            professor: Professor {
                id: self.professor_id,
                name: self.professor_name,
            },
            ratings,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RatingEntity {
    id: String,
    syllabus_id: String,
    course_rating: Option<i64>,
    professor_rating: Option<i64>,
    comment: Option<String>,
    created_at: i64,
}

impl From<RatingEntity> for Rating {
    fn from(entity: RatingEntity) -> Self {
        Self {
            id: entity.id,
            course_rating: entity.course_rating,
            professor_rating: entity.professor_rating,
            comment: entity.comment,
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NamedEntity {
    id: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct CourseEntity {
    id: String,
    name: String,
    course_code: String,
    school_id: String,
    school_name: String,
}

impl From<CourseEntity> for Course {
    fn from(entity: CourseEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            course_code: entity.course_code,
            school: School {
                id: entity.school_id,
                name: entity.school_name,
            },
        }
    }
}
