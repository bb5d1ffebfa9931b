use super::{reset_email_html, Mailer, RESET_SUBJECT};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::MailConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config.smtp_host.trim();
        // `smtp_secure` means implicit TLS (usually port 465); otherwise STARTTLS.
        let builder = if config.smtp_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| AppError::ConfigError(format!("Invalid SMTP host {host}: {e}")))?;

        let mut builder = builder.port(config.smtp_port);
        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::ConfigError(format!("Invalid mail.from address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<()> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::MailError(format!("Invalid recipient {to}: {e}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(RESET_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(reset_email_html(reset_url))
            .map_err(|e| AppError::MailError(format!("Failed to build reset email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::MailError(format!("Failed to send reset email: {e}")))?;

        info!(to, "Password reset email sent");
        Ok(())
    }
}
