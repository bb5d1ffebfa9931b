use crate::domain::error::{AppError, Result};
use crate::domain::user::User;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, reset_token_hash, reset_token_expiry, created_at, updated_at";

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let now = chrono::Utc::now().timestamp_millis();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            reset_token_hash: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict_or(e, "Failed to insert user"))?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user by email: {e}")))?;

        Ok(user.map(|user| user.into()))
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user: {e}")))?;

        Ok(user.map(|user| user.into()))
    }

    pub async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = ?"
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to fetch user by reset token: {e}"))
        })?;

        Ok(user.map(|user| user.into()))
    }

    pub async fn set_reset_token(
        &self,
        user_id: &str,
        digest: &str,
        expires_at: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = ?, reset_token_expiry = ?, updated_at = ? WHERE id = ?",
        )
        .bind(digest)
        .bind(expires_at)
        .bind(chrono::Utc::now().timestamp_millis())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to store reset token: {e}")))?;

        Ok(())
    }

    /// Stores the new hash and clears any pending reset token.
    pub async fn reset_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users
             SET password_hash = ?, reset_token_hash = NULL, reset_token_expiry = NULL, updated_at = ?
             WHERE id = ?",
        )
        .bind(password_hash)
        .bind(chrono::Utc::now().timestamp_millis())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to reset password: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: {user_id}")));
        }
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users
             SET name = ?, email = ?, password_hash = COALESCE(?, password_hash), updated_at = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(chrono::Utc::now().timestamp_millis())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict_or(e, "Failed to update profile"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

fn email_conflict_or(err: sqlx::Error, context: &str) -> AppError {
    let unique = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        AppError::Conflict("Email already in use".to_string())
    } else {
        AppError::DatabaseError(format!("{context}: {err}"))
    }
}

#[derive(sqlx::FromRow)]
struct UserEntity {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    reset_token_hash: Option<String>,
    reset_token_expiry: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            password_hash: entity.password_hash,
            reset_token_hash: entity.reset_token_hash,
            reset_token_expiry: entity.reset_token_expiry,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
