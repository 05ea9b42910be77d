//! Outbound mail. Without SMTP credentials the mailer runs in no-op mode
//! and logs what it would have sent, which keeps local development free of
//! email infrastructure.

use std::sync::Arc;

use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct Mailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Option<Mailbox>,
}

impl Mailer {
    pub fn new(config: Option<&SmtpConfig>) -> AppResult<Self> {
        let Some(config) = config else {
            tracing::warn!("SMTP not configured; mailer running in no-op mode");
            return Ok(Self {
                transport: None,
                from: None,
            });
        };

        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("invalid SMTP_FROM address: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Config(format!("smtp transport: {e}")))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport: Some(Arc::new(transport)),
            from: Some(from),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send_password_reset(
        &self,
        recipient: &str,
        reset_link: &str,
    ) -> AppResult<()> {
        let body = format!(
            "We received a request to reset your password.\n\n\
            Click the link below to choose a new one:\n{reset_link}\n\n\
            This link expires in 1 hour. If you did not request a reset,\n\
            you can ignore this email."
        );
        self.send(recipient, "Password Reset Request", &body).await
    }

    pub async fn send_welcome(&self, recipient: &str, name: &str) -> AppResult<()> {
        let body = format!(
            "Hi {name},\n\nYour account has been created. You can now create\n\
            shipments and follow their status in real time."
        );
        self.send(recipient, "Welcome to Shiptrack", &body).await
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!(recipient, subject, "no-op mailer; skipping send");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("build email: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("send email: {e}")))?;
        tracing::info!(recipient, subject, "email sent");
        Ok(())
    }
}
