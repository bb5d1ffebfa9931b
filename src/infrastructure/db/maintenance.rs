use crate::domain::error::{AppError, Result};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

/// Rows removed per table by [`clear_all`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub ratings: u64,
    pub syllabi: u64,
    pub courses: u64,
    pub professors: u64,
    pub schools: u64,
    pub users: u64,
}

impl ClearReport {
    pub fn total(&self) -> u64 {
        self.ratings + self.syllabi + self.courses + self.professors + self.schools + self.users
    }
}

/// Empties every table, children before parents, in one transaction.
pub async fn clear_all(pool: &SqlitePool) -> Result<ClearReport> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to start clear tx: {e}")))?;

    let mut report = ClearReport::default();
    for (table, slot) in [
        ("ratings", &mut report.ratings),
        ("syllabi", &mut report.syllabi),
        ("courses", &mut report.courses),
        ("professors", &mut report.professors),
        ("schools", &mut report.schools),
        ("users", &mut report.users),
    ] {
        let result = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear {table}: {e}")))?;
        *slot = result.rows_affected();
    }

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit clear tx: {e}")))?;

    Ok(report)
}
