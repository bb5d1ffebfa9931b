use crate::domain::error::{AppError, Result, TokenErrorKind};
use crate::domain::user::{
    normalize_email, ForgotPasswordRequest, LoginRequest, PublicUser, ResetPasswordRequest,
    SignupRequest, UpdateProfileRequest, User,
};
use crate::infrastructure::db::users::UserRepository;
use crate::infrastructure::mail::Mailer;
use crate::infrastructure::security::password::PasswordService;
use crate::infrastructure::security::token::{token_digest, TokenKind, TokenSigner};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_ttl_secs: i64,
    pub reset_ttl_secs: i64,
    pub app_url: String,
}

/// A signed-in user plus the session token to put in the cookie.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: PublicUser,
    pub token: String,
}

pub struct AuthUseCase {
    users: Arc<UserRepository>,
    passwords: PasswordService,
    tokens: TokenSigner,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
}

impl AuthUseCase {
    pub fn new(
        users: Arc<UserRepository>,
        passwords: PasswordService,
        tokens: TokenSigner,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            mailer,
            settings,
        }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.settings.session_ttl_secs
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<AuthSession> {
        let request = SignupRequest {
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            password: request.password,
        };
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.passwords.hash(&request.password).await?;
        let user = self
            .users
            .create(&request.name, &request.email, &password_hash)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
                other => other,
            })?;

        info!(user_id = %user.id, "User signed up");
        self.open_session(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        let email = normalize_email(&request.email);
        let unauthorized = || AppError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.passwords.verify_missing(&request.password).await?;
            return Err(unauthorized());
        };
        if !self
            .passwords
            .verify(&request.password, &user.password_hash)
            .await?
        {
            return Err(unauthorized());
        }

        info!(user_id = %user.id, "User logged in");
        self.open_session(&user)
    }

    /// `None` when the token is absent, invalid, expired or names an unknown user.
    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<PublicUser>> {
        let Some(user_id) = self.session_subject(token) else {
            return Ok(None);
        };
        Ok(self
            .users
            .find_by_id(&user_id)
            .await?
            .map(|user| PublicUser::from(&user)))
    }

    /// Succeeds the same way whether or not the email is registered.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<()> {
        let email = normalize_email(&request.email);
        if email.is_empty() {
            return Ok(());
        }
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(());
        };

        let token = self.tokens.issue(
            &user.id,
            TokenKind::PasswordReset,
            self.settings.reset_ttl_secs,
        )?;
        let expires_at = now_ms() + self.settings.reset_ttl_secs * 1000;
        self.users
            .set_reset_token(&user.id, &token_digest(&token), expires_at)
            .await?;

        let reset_url = self.reset_url(&token)?;
        if let Err(e) = self
            .mailer
            .send_password_reset(&user.email, &reset_url)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to deliver password reset email");
        }
        Ok(())
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<()> {
        let token = request.token.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.unwrap_or_default();
        if token.is_empty() || password.is_empty() {
            return Err(AppError::TokenError(TokenErrorKind::MissingFields));
        }

        let claims = self.tokens.verify(token, TokenKind::PasswordReset)?;
        let user = self
            .users
            .find_by_reset_digest(&token_digest(token))
            .await?
            .filter(|user| user.id == claims.sub)
            .ok_or(AppError::TokenError(TokenErrorKind::Invalid))?;
        let expired = user.reset_token_expiry.map_or(true, |at| at <= now_ms());
        if expired {
            return Err(AppError::TokenError(TokenErrorKind::Expired));
        }

        check_password_length(&password)?;
        let password_hash = self.passwords.hash(&password).await?;
        self.users.reset_password(&user.id, &password_hash).await?;
        info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    pub async fn update_profile(
        &self,
        token: Option<&str>,
        request: UpdateProfileRequest,
    ) -> Result<PublicUser> {
        let user_id = self
            .session_subject(token)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let request = UpdateProfileRequest {
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            current_password: request.current_password,
            new_password: request.new_password.filter(|pw| !pw.is_empty()),
        };
        request.validate()?;

        let password_hash = match &request.new_password {
            None => None,
            Some(new_password) => {
                let current = request
                    .current_password
                    .as_deref()
                    .filter(|pw| !pw.is_empty())
                    .ok_or_else(|| {
                        AppError::ValidationError("Current password is required".to_string())
                    })?;
                if !self.passwords.verify(current, &user.password_hash).await? {
                    return Err(AppError::ValidationError(
                        "Current password is incorrect".to_string(),
                    ));
                }
                Some(self.passwords.hash(new_password).await?)
            }
        };

        if request.email != user.email
            && self.users.find_by_email(&request.email).await?.is_some()
        {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let updated = self
            .users
            .update_profile(
                &user.id,
                &request.name,
                &request.email,
                password_hash.as_deref(),
            )
            .await?;
        info!(user_id = %updated.id, password_changed = password_hash.is_some(), "Profile updated");
        Ok(PublicUser::from(&updated))
    }

    fn open_session(&self, user: &User) -> Result<AuthSession> {
        let token = self
            .tokens
            .issue(&user.id, TokenKind::Session, self.settings.session_ttl_secs)?;
        Ok(AuthSession {
            user: PublicUser::from(user),
            token,
        })
    }

    fn session_subject(&self, token: Option<&str>) -> Option<String> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        self.tokens
            .verify(token, TokenKind::Session)
            .ok()
            .map(|claims| claims.sub)
    }

    fn reset_url(&self, token: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.settings.app_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid app URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("App URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("reset-password");
        url.query_pairs_mut().append_pair("token", token);
        Ok(url.to_string())
    }
}

fn check_password_length(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::connect_in_memory;
    use crate::infrastructure::mail::recording::RecordingMailer;
    use sqlx::SqlitePool;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    struct Harness {
        pool: SqlitePool,
        mailer: Arc<RecordingMailer>,
        auth: AuthUseCase,
    }

    async fn harness_with(mailer: RecordingMailer) -> Harness {
        let pool = connect_in_memory().await;
        let mailer = Arc::new(mailer);
        let auth = AuthUseCase::new(
            Arc::new(UserRepository::new(pool.clone())),
            PasswordService::fast(),
            TokenSigner::new(SECRET),
            mailer.clone(),
            AuthSettings {
                session_ttl_secs: 3600,
                reset_ttl_secs: 3600,
                app_url: "http://localhost:3000".to_string(),
            },
        );
        Harness { pool, mailer, auth }
    }

    async fn harness() -> Harness {
        harness_with(RecordingMailer::default()).await
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    fn token_from(url: &str) -> String {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .unwrap()
    }

    fn token_kind(err: AppError) -> TokenErrorKind {
        match err {
            AppError::TokenError(kind) => kind,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn signup_then_me_returns_the_user() {
        let h = harness().await;
        let session = h.auth.signup(signup(" Ada@Example.com ")).await.unwrap();
        assert_eq!(session.user.email, "ada@example.com");

        let me = h.auth.current_user(Some(&session.token)).await.unwrap();
        assert_eq!(me, Some(session.user));
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let h = harness().await;
        h.auth.signup(signup("ada@example.com")).await.unwrap();
        let err = h.auth.signup(signup("ADA@example.com")).await.unwrap_err();
        assert_eq!(err.client_message("x"), "Email already registered");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn login_failures_share_one_message() {
        let h = harness().await;
        h.auth.signup(signup("ada@example.com")).await.unwrap();

        let wrong_password = h
            .auth
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "nope nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown = h
            .auth
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap_err();
        assert!(h.auth.passwords.has_placeholder());
        for err in [wrong_password, unknown] {
            match err {
                AppError::Unauthorized(msg) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("unexpected error: {other}"),
            }
        }

        let ok = h
            .auth
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.name, "Ada");
    }

    #[tokio::test]
    async fn garbage_session_means_no_user() {
        let h = harness().await;
        assert_eq!(h.auth.current_user(None).await.unwrap(), None);
        assert_eq!(h.auth.current_user(Some("x.y.z")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn forgot_password_mails_only_known_users() {
        let h = harness().await;
        h.auth.signup(signup("ada@example.com")).await.unwrap();

        h.auth
            .forgot_password(ForgotPasswordRequest {
                email: "ghost@example.com".to_string(),
            })
            .await
            .unwrap();
        assert!(h.mailer.sent().is_empty());

        h.auth
            .forgot_password(ForgotPasswordRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ada@example.com");
        let link_prefix = "http://localhost:3000/reset-password?token=ey";
        assert!(sent[0].1.starts_with(link_prefix));

        let stored: Option<String> =
            sqlx::query_scalar("SELECT reset_token_hash FROM users WHERE email = ?")
                .bind("ada@example.com")
                .fetch_one(&h.pool)
                .await
                .unwrap();
        assert_eq!(stored, Some(token_digest(&token_from(&sent[0].1))));
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_the_request() {
        let h = harness_with(RecordingMailer::failing()).await;
        h.auth.signup(signup("ada@example.com")).await.unwrap();
        h.auth
            .forgot_password(ForgotPasswordRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_password_full_flow() {
        let h = harness().await;
        h.auth.signup(signup("ada@example.com")).await.unwrap();
        h.auth
            .forgot_password(ForgotPasswordRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        let token = token_from(&h.mailer.sent()[0].1);

        h.auth
            .reset_password(ResetPasswordRequest {
                token: Some(token.clone()),
                password: Some("new password".to_string()),
            })
            .await
            .unwrap();

        let relogin = h
            .auth
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "new password".to_string(),
            })
            .await;
        assert!(relogin.is_ok());

        let reused = h
            .auth
            .reset_password(ResetPasswordRequest {
                token: Some(token),
                password: Some("another password".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(token_kind(reused), TokenErrorKind::Invalid);
    }

    #[tokio::test]
    async fn reset_password_error_codes() {
        let h = harness().await;
        let session = h.auth.signup(signup("ada@example.com")).await.unwrap();

        let missing = h
            .auth
            .reset_password(ResetPasswordRequest {
                token: Some("t".to_string()),
                password: None,
            })
            .await
            .unwrap_err();
        assert_eq!(token_kind(missing), TokenErrorKind::MissingFields);

        let session_token = h
            .auth
            .reset_password(ResetPasswordRequest {
                token: Some(session.token),
                password: Some("new password".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(token_kind(session_token), TokenErrorKind::Invalid);

        h.auth
            .forgot_password(ForgotPasswordRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        let token = token_from(&h.mailer.sent()[0].1);
        sqlx::query("UPDATE users SET reset_token_expiry = 1")
            .execute(&h.pool)
            .await
            .unwrap();
        let expired = h
            .auth
            .reset_password(ResetPasswordRequest {
                token: Some(token),
                password: Some("new password".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(token_kind(expired), TokenErrorKind::Expired);
    }

    #[tokio::test]
    async fn update_profile_requires_session_and_current_password() {
        let h = harness().await;
        let session = h.auth.signup(signup("ada@example.com")).await.unwrap();
        let update = UpdateProfileRequest {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            current_password: None,
            new_password: Some("brand new pw".to_string()),
        };

        let err = h
            .auth
            .update_profile(None, update.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = h
            .auth
            .update_profile(Some(&session.token), update.clone())
            .await
            .unwrap_err();
        assert_eq!(err.client_message("x"), "Current password is required");

        let err = h
            .auth
            .update_profile(
                Some(&session.token),
                UpdateProfileRequest {
                    current_password: Some("wrong password".to_string()),
                    ..update.clone()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.client_message("x"), "Current password is incorrect");

        let user = h
            .auth
            .update_profile(
                Some(&session.token),
                UpdateProfileRequest {
                    current_password: Some("correct horse".to_string()),
                    ..update
                },
            )
            .await
            .unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert!(h
            .auth
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "brand new pw".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_email() {
        let h = harness().await;
        h.auth.signup(signup("grace@example.com")).await.unwrap();
        let session = h.auth.signup(signup("ada@example.com")).await.unwrap();
        let err = h
            .auth
            .update_profile(
                Some(&session.token),
                UpdateProfileRequest {
                    name: "Ada".to_string(),
                    email: "Grace@example.com".to_string(),
                    current_password: None,
                    new_password: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.client_message("x"), "Email already in use");
    }

    #[tokio::test]
    async fn reset_url_keeps_app_path() {
        let mut h = harness().await;
        h.auth.settings.app_url = "https://example.com/app/".to_string();
        let url = h.auth.reset_url("abc").unwrap();
        assert_eq!(url, "https://example.com/app/reset-password?token=abc");
    }
}
