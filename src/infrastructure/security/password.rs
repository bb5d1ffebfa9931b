use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::domain::error::{AppError, Result};

/// Argon2id hashing. Work runs on the blocking pool.
#[derive(Clone, Default)]
pub struct PasswordService {
    params: Params,
    /// Hash checked when no account exists, built on first use.
    placeholder: Arc<OnceCell<String>>,
}

impl PasswordService {
    /// Cheap parameters for tests.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            params: Params::new(1024, 1, 1, None).expect("valid argon2 params"),
            placeholder: Arc::default(),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let params = self.params.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
                .map_err(|e| AppError::Internal(format!("Failed to build salt: {e}")))?;
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is unusable.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored_hash)
                .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {e}")))?;
            // Parameters are read from the PHC string itself.
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))?
    }

    /// Spends the same work as [`Self::verify`] for an account that does not
    /// exist, so login latency does not reveal which emails are registered.
    pub async fn verify_missing(&self, password: &str) -> Result<()> {
        let placeholder = self
            .placeholder
            .get_or_try_init(|| async { self.hash(&Uuid::new_v4().to_string()).await })
            .await?;
        self.verify(password, placeholder).await.map(|_| ())
    }

    #[cfg(test)]
    pub fn has_placeholder(&self) -> bool {
        self.placeholder.initialized()
    }
}
