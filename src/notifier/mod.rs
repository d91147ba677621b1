//! Operator notification email
//!
//! The handler hands a fully rendered [`OutgoingEmail`] to a [`Notifier`] and
//! only waits for success or failure.

mod log;
mod smtp;

use std::future::Future;

use anyhow::Context;

pub use log::LogNotifier;
pub use smtp::SmtpNotifier;

use crate::config::{NotifierBackend, NotifierConfig};

/// One HTML email to the site operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// `None` when no from-address was configured
    pub from: Option<String>,
    /// `None` when no operator address was configured
    pub to: Option<String>,
    pub subject: String,
    pub html: String,
}

impl OutgoingEmail {
    /// Both addresses, or an error naming the missing one
    pub fn addresses(&self) -> anyhow::Result<(&str, &str)> {
        let from = self
            .from
            .as_deref()
            .filter(|a| !a.is_empty())
            .context("sender address is not configured")?;
        let to = self
            .to
            .as_deref()
            .filter(|a| !a.is_empty())
            .context("recipient address is not configured")?;
        Ok((from, to))
    }
}

/// Send-email collaborator
pub trait Notifier {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = anyhow::Result<()>>;
}

/// Notifier selected by configuration
#[derive(Clone)]
pub enum AnyNotifier {
    Smtp(SmtpNotifier),
    Log(LogNotifier),
}

impl AnyNotifier {
    pub fn from_config(config: &NotifierConfig) -> anyhow::Result<Self> {
        Ok(match config.backend {
            NotifierBackend::Smtp => Self::Smtp(SmtpNotifier::new(config)?),
            NotifierBackend::Log => Self::Log(LogNotifier),
        })
    }
}

impl Notifier for AnyNotifier {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        match self {
            Self::Smtp(n) => n.send(email).await,
            Self::Log(n) => n.send(email).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(from: Option<&str>, to: Option<&str>) -> OutgoingEmail {
        OutgoingEmail {
            from: from.map(String::from),
            to: to.map(String::from),
            subject: "s".to_string(),
            html: "<p>h</p>".to_string(),
        }
    }

    #[test]
    fn test_addresses_present() {
        let e = email(Some("site@example.com"), Some("ops@example.com"));
        assert_eq!(
            e.addresses().unwrap(),
            ("site@example.com", "ops@example.com")
        );
    }

    #[test]
    fn test_addresses_missing() {
        let err = email(None, Some("ops@example.com")).addresses().unwrap_err();
        assert!(err.to_string().contains("sender"));
        let err = email(Some("site@example.com"), Some("")).addresses().unwrap_err();
        assert!(err.to_string().contains("recipient"));
    }
}
