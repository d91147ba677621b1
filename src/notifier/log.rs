//! Notifier that logs emails instead of sending them (local development)

use tracing::info;

use super::{Notifier, OutgoingEmail};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        let (from, to) = email.addresses()?;
        info!(
            from,
            to,
            subject = %email.subject,
            html_bytes = email.html.len(),
            "Email not sent (log notifier)"
        );
        Ok(())
    }
}
