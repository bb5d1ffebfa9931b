pub mod smtp;

use crate::domain::error::Result;
use crate::infrastructure::config::MailConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub use smtp::SmtpMailer;

pub const RESET_SUBJECT: &str = "Reset Your Password - Syllabus Seeker";

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<()>;
}

/// Used when no SMTP host is configured; the link only goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<()> {
        info!(to, reset_url, "SMTP disabled, password reset link not sent");
        Ok(())
    }
}

pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    if config.smtp_host.trim().is_empty() {
        return Ok(Arc::new(LogMailer));
    }
    Ok(Arc::new(SmtpMailer::new(config)?))
}

pub fn reset_email_html(reset_url: &str) -> String {
    format!(
        "<h1>Reset Your Password</h1>\n\
         <p>You have requested to reset your password. Click the link below to set a new password:</p>\n\
         <a href=\"{reset_url}\">Reset Password</a>\n\
         <p>This link will expire in 1 hour.</p>\n\
         <p>If you didn't request this, please ignore this email.</p>\n"
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::AppConfig;

    #[test]
    fn reset_email_links_to_the_url() {
        let html = reset_email_html("https://app.test/reset-password?token=abc");
        assert!(html.contains("href=\"https://app.test/reset-password?token=abc\""));
        assert!(html.contains("expire in 1 hour"));
    }

    #[tokio::test]
    async fn empty_host_falls_back_to_log_mailer() {
        let mailer = build_mailer(&AppConfig::default().mail).unwrap();
        mailer
            .send_password_reset("ada@example.com", "https://app.test/reset-password?token=t")
            .await
            .unwrap();
    }
}
