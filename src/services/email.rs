//! Outgoing email for password resets
//!
//! Async SMTP transport via lettre. When no SMTP host is configured the
//! service runs in no-op mode and only logs, so development environments
//! need no mail infrastructure.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::Config;

#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    password_reset_base_url: Option<String>,
}

impl EmailService {
    /// Build the email service from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid SMTP_FROM address: {}", e))?;

        let transport = match &config.smtp_host {
            None => {
                warn!("SMTP host not configured; email service will operate in no-op mode");
                None
            }
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| anyhow!("Failed to configure SMTP transport: {}", e))?
                    .port(config.smtp_port);

                if let (Some(username), Some(password)) =
                    (&config.smtp_username, &config.smtp_password)
                {
                    builder = builder
                        .credentials(Credentials::new(username.clone(), password.clone()));
                }

                Some(Arc::new(builder.build()))
            }
        };

        Ok(Self {
            transport,
            from,
            password_reset_base_url: config.password_reset_base_url.clone(),
        })
    }

    /// Send a password reset email carrying the raw reset token
    pub async fn send_password_reset_email(&self, recipient: &str, token: &str) -> Result<()> {
        let link = match &self.password_reset_base_url {
            Some(base) => format!("{}?token={}", base.trim_end_matches('/'), token),
            None => token.to_string(),
        };

        let body = format!(
            "A password reset was requested for your MediaViewer account.\n\n\
             Use the following link to choose a new password:\n{}\n\n\
             If you did not request this, you can ignore this email.",
            link
        );

        self.send_mail(recipient, "MediaViewer password reset", &body)
            .await
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            info!(recipient = recipient, subject = subject, "Email disabled; not sending");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid recipient address: {}", e))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())?;

        transport.send(message).await?;
        info!(recipient = recipient, subject = subject, "Sent email");

        Ok(())
    }
}
