//! Status-change notification mail. No-op without SMTP credentials.

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
            tracing::warn!("SMTP not configured; status emails will be logged only");
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

    pub async fn send_status_notification(
        &self,
        recipient: &str,
        tracking_number: &str,
        status: &str,
    ) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!(recipient, tracking_number, status, "no-op mailer; skipping send");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(format!("Shipment {tracking_number} is now {status}"))
            .header(header::ContentType::TEXT_PLAIN)
            .body(format!(
                "Shipment {tracking_number} changed status to: {status}.\n\n\
                Log in to view the full shipment details."
            ))
            .map_err(|e| AppError::Internal(format!("build email: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("send email: {e}")))?;
        tracing::info!(recipient, tracking_number, status, "status email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_mailer_accepts_sends() {
        let mailer = Mailer::new(None).unwrap();
        mailer
            .send_status_notification("bob@example.com", "TRK-1-1", "Delivered")
            .await
            .unwrap();
    }
}
