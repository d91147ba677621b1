//! SMTP notifier using lettre

use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use super::{Notifier, OutgoingEmail};
use crate::config::NotifierConfig;

#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: SmtpTransport,
}

impl SmtpNotifier {
    pub fn new(config: &NotifierConfig) -> anyhow::Result<Self> {
        let mailer = if config.smtp_username.is_empty() || config.smtp_password.is_empty() {
            info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                "SMTP credentials not configured, using unauthenticated connection"
            );
            SmtpTransport::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                "SMTP notifier initialized with authentication and TLS"
            );
            let creds =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
            SmtpTransport::relay(&config.smtp_host)?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self { mailer })
    }
}

/// Build the lettre message for an outgoing email
fn build_message(email: &OutgoingEmail) -> anyhow::Result<Message> {
    let (from, to) = email.addresses()?;
    Message::builder()
        .from(from.parse().with_context(|| format!("invalid sender '{from}'"))?)
        .to(to.parse().with_context(|| format!("invalid recipient '{to}'"))?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .context("failed to build email")
}

impl Notifier for SmtpNotifier {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        let message = build_message(&email)?;
        let mailer = self.mailer.clone();
        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .context("email send task failed")?
            .context("SMTP send failed")?;
        Ok(())
    }
}
