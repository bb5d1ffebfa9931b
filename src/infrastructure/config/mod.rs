use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

const CONFIG_FILE: &str = "SyllabusSeeker.toml";
const ENV_PREFIX: &str = "SYLLABUS_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public URL of the web app, used to build password-reset links.
    pub app_url: String,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub max_json_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_secret: String,
    pub session_ttl_secs: i64,
    pub reset_ttl_secs: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Empty disables SMTP delivery; reset links are then only logged.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
                app_url: "http://localhost:3000".to_string(),
                cors_allowed_origins: Vec::new(),
                max_upload_bytes: 10 * 1024 * 1024,
                max_json_bytes: 2 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: "sqlite://syllabus_seeker.db".to_string(),
                max_connections: 8,
                busy_timeout_secs: 5,
            },
            auth: AuthConfig {
                token_secret: String::new(),
                session_ttl_secs: 60 * 60 * 24 * 7,
                reset_ttl_secs: 60 * 60,
                cookie_name: "auth_token".to_string(),
                cookie_secure: false,
            },
            storage: StorageConfig {
                base_url: "https://api.cloudinary.com".to_string(),
                cloud_name: String::new(),
                upload_preset: String::new(),
                timeout_secs: 60,
            },
            mail: MailConfig {
                smtp_host: String::new(),
                smtp_port: 587,
                smtp_secure: false,
                smtp_user: String::new(),
                smtp_pass: String::new(),
                from: "Syllabus Seeker <no-reply@localhost>".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `SyllabusSeeker.toml`, then `SYLLABUS_*` variables
    /// (nested keys use `__`, e.g. `SYLLABUS_AUTH__TOKEN_SECRET`).
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.token_secret.trim().len() < 32 {
            return Err(AppError::ConfigError(
                "auth.token_secret must be at least 32 characters".to_string(),
            ));
        }
        if self.auth.session_ttl_secs <= 0 || self.auth.reset_ttl_secs <= 0 {
            return Err(AppError::ConfigError("token lifetimes must be > 0".to_string()));
        }
        if self.server.max_upload_bytes == 0 || self.server.max_json_bytes == 0 {
            return Err(AppError::ConfigError("size limits must be > 0".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::ConfigError(
                "database.max_connections must be > 0".to_string(),
            ));
        }
        url::Url::parse(&self.server.app_url)
            .map_err(|e| AppError::ConfigError(format!("server.app_url is not a URL: {e}")))?;
        url::Url::parse(&self.storage.base_url)
            .map_err(|e| AppError::ConfigError(format!("storage.base_url is not a URL: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    #[test]
    fn rejects_missing_token_secret() {
        let err = AppConfig::from_figment(figment()).unwrap_err();
        assert!(err.to_string().contains("token_secret"));
    }

    #[test]
    fn layered_values_override_defaults() {
        let config = AppConfig::from_figment(
            figment()
                .merge(Serialized::default("auth.token_secret", SECRET))
                .merge(Serialized::default("server.port", 8080)),
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.session_ttl_secs, 604_800);
        assert_eq!(config.auth.cookie_name, "auth_token");
    }

    #[test]
    fn rejects_zero_upload_limit() {
        let err = AppConfig::from_figment(
            figment()
                .merge(Serialized::default("auth.token_secret", SECRET))
                .merge(Serialized::default("server.max_upload_bytes", 0)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("size limits"));
    }
}
