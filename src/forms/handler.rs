//! Submission handler
//!
//! Runs one submission through the fixed pipeline:
//! 1. Parse the JSON body, which must be an object
//! 2. Honeypot check (400, generic message)
//! 3. Field validation (400, first failing rule)
//! 4. Build the normalized record
//! 5. Store the record and send the operator email concurrently
//! 6. Respond 200 with the record timestamp
//!
//! Any other failure is logged and answered with a generic 500. The caller
//! cannot tell whether one of the two effects in step 5 went through.

use anyhow::Context;
use chrono::Utc;
use serde_json::{json, Value};

use super::email;
use super::event::{FormEvent, FormResponse};
use super::kind::FormKind;
use super::spam::{self, HONEYPOT_FIELD};
use super::validate::{validate_application, validate_contact, ValidationError};
use crate::config::FormsConfig;
use crate::logger;
use crate::notifier::Notifier;
use crate::store::SubmissionStore;

/// Shown for honeypot hits; indistinguishable from a validation failure
pub const SPAM_MESSAGE: &str = "Invalid submission";

enum Outcome {
    Spam,
    Invalid(ValidationError),
    Accepted { timestamp: i64 },
}

pub struct SubmissionHandler<S, N> {
    store: S,
    notifier: N,
    config: FormsConfig,
}

impl<S, N> SubmissionHandler<S, N>
where
    S: SubmissionStore,
    N: Notifier,
{
    pub const fn new(store: S, notifier: N, config: FormsConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Handle one submission for `kind`
    pub async fn handle(&self, kind: FormKind, event: &FormEvent) -> FormResponse {
        match self.process(kind, event).await {
            Ok(Outcome::Spam) => FormResponse::error(400, SPAM_MESSAGE),
            Ok(Outcome::Invalid(err)) => FormResponse::error(400, &err.to_string()),
            Ok(Outcome::Accepted { timestamp }) => FormResponse::json(
                200,
                &json!({
                    "message": kind.success_message(),
                    "timestamp": timestamp,
                }),
            ),
            Err(err) => {
                logger::log_submission_failed(kind.label(), &err);
                FormResponse::error(500, kind.failure_message())
            }
        }
    }

    async fn process(&self, kind: FormKind, event: &FormEvent) -> anyhow::Result<Outcome> {
        let payload: Value =
            serde_json::from_str(&event.body).context("request body is not valid JSON")?;
        anyhow::ensure!(payload.is_object(), "request body is not a JSON object");

        if spam::is_spam(payload.get(HONEYPOT_FIELD), event) {
            return Ok(Outcome::Spam);
        }

        let now = Utc::now();
        let validated = match kind {
            FormKind::Contact => validate_contact(&payload, now),
            FormKind::Application => validate_application(&payload, now),
        };
        let submission = match validated {
            Ok(submission) => submission,
            Err(err) => return Ok(Outcome::Invalid(err)),
        };

        let key = submission.storage_key();
        let item = submission.to_item();
        let outgoing = email::compose(&submission, &self.config)?;

        tokio::try_join!(
            async {
                self.store
                    .put(self.config.table_name.as_deref(), &key, item)
                    .await
                    .context("failed to store submission")
            },
            async {
                self.notifier
                    .send(outgoing)
                    .await
                    .context("failed to send notification email")
            },
        )?;

        let timestamp = submission.stamp().timestamp;
        logger::log_submission_stored(kind.label(), timestamp);
        Ok(Outcome::Accepted { timestamp })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::forms::record::StorageKey;
    use crate::notifier::OutgoingEmail;
    use crate::store::{Item, MemoryStore};
    use std::sync::Mutex;

    /// Notifier that records every email it is asked to send
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
            email.addresses()?;
            if self.fail {
                anyhow::bail!("mail relay unavailable");
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    struct FailingStore;

    impl SubmissionStore for FailingStore {
        async fn put(&self, _: Option<&str>, _: &StorageKey, _: Item) -> anyhow::Result<()> {
            anyhow::bail!("table unavailable")
        }
    }

    fn config() -> FormsConfig {
        FormsConfig {
            table_name: Some("devtrolls".to_string()),
            from_email: Some("website@example.com".to_string()),
            to_email: Some("operator@example.com".to_string()),
        }
    }

    pub fn handler() -> SubmissionHandler<MemoryStore, RecordingNotifier> {
        SubmissionHandler::new(MemoryStore::default(), RecordingNotifier::default(), config())
    }

    fn event(body: &Value) -> FormEvent {
        FormEvent {
            body: body.to_string(),
            source_ip: Some("198.51.100.4".to_string()),
            user_agent: Some("test-agent".to_string()),
        }
    }

    fn error_of(resp: &FormResponse) -> String {
        resp.body_json().unwrap()["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let h = handler();
        let body = json!({"name": "John Doe", "email": "john#noatsymbol.com", "message": "x"});
        let resp = h.handle(FormKind::Contact, &event(&body)).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(error_of(&resp), "Valid email is required");
        assert_eq!(h.store().put_count(), 0);
        assert_eq!(h.notifier().count(), 0);
    }

    #[tokio::test]
    async fn test_honeypot_rejected_generically() {
        let h = handler();
        let body = json!({
            "name": "Spam Bot",
            "email": "spam@spammer.com",
            "message": "Buy!",
            "website": "http://spam.com"
        });
        let resp = h.handle(FormKind::Contact, &event(&body)).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(error_of(&resp), SPAM_MESSAGE);
        assert_eq!(h.store().put_count(), 0);
        assert_eq!(h.notifier().count(), 0);
    }

    #[tokio::test]
    async fn test_honeypot_checked_before_validation() {
        let h = handler();
        let body = json!({"job": "fake-job", "website": "x"});
        let resp = h.handle(FormKind::Application, &event(&body)).await;
        assert_eq!(error_of(&resp), SPAM_MESSAGE);
    }

    #[tokio::test]
    async fn test_invalid_job_rejected() {
        let h = handler();
        let body = json!({"job": "fake-job", "name": "John", "email": "john@example.com", "statement": "hi"});
        let resp = h.handle(FormKind::Application, &event(&body)).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(error_of(&resp), "Please select a valid job position");
    }

    #[tokio::test]
    async fn test_blank_required_field_names_it() {
        let h = handler();
        let body = json!({"name": "Jane", "email": "jane@example.com", "message": "  "});
        let resp = h.handle(FormKind::Contact, &event(&body)).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(error_of(&resp), "Message is required");
        assert_eq!(h.store().put_count(), 0);
        assert_eq!(h.notifier().count(), 0);
    }

    #[tokio::test]
    async fn test_each_blank_required_field_is_named() {
        let contact = json!({"name": "Jane", "email": "jane@example.com", "message": "Hello"});
        let application = json!({
            "job": "brand-manager",
            "name": "Jane",
            "email": "jane@example.com",
            "statement": "Hello"
        });
        let cases = [
            (FormKind::Contact, &contact, "name", "Name is required"),
            (FormKind::Contact, &contact, "email", "Valid email is required"),
            (FormKind::Contact, &contact, "message", "Message is required"),
            (FormKind::Application, &application, "name", "Name is required"),
            (FormKind::Application, &application, "email", "Valid email is required"),
            (FormKind::Application, &application, "statement", "Application statement is required"),
        ];

        for (kind, base, field, expected) in cases {
            for blank in ["", "   "] {
                let h = handler();
                let mut body = base.clone();
                body[field] = json!(blank);
                let resp = h.handle(kind, &event(&body)).await;
                assert_eq!(resp.status_code, 400, "{field} = {blank:?}");
                assert_eq!(error_of(&resp), expected, "{field} = {blank:?}");
                assert_eq!(h.store().put_count(), 0);
                assert_eq!(h.notifier().count(), 0);
            }
        }
    }

    #[tokio::test]
    async fn test_non_object_body_is_500() {
        for body in ["null", "[1]", "\"Jane\"", "42"] {
            let h = handler();
            let resp = h.handle(FormKind::Contact, &FormEvent::new(body)).await;
            assert_eq!(resp.status_code, 500, "{body}");
            assert_eq!(error_of(&resp), "Failed to process contact form");
            assert_eq!(h.store().put_count(), 0);
            assert_eq!(h.notifier().count(), 0);
        }
    }

    #[tokio::test]
    async fn test_valid_contact_stores_and_notifies_once() {
        let h = handler();
        let body = json!({
            "name": "Jane Smith",
            "email": "jane@example.com",
            "phone": "555-1234",
            "message": "Interested."
        });
        let before = Utc::now().timestamp_millis();
        let resp = h.handle(FormKind::Contact, &event(&body)).await;
        let after = Utc::now().timestamp_millis();

        assert_eq!(resp.status_code, 200);
        let json = resp.body_json().unwrap();
        assert_eq!(json["message"], "Contact form submitted successfully");
        let timestamp = json["timestamp"].as_i64().unwrap();
        assert!((before..=after).contains(&timestamp));

        assert_eq!(h.store().put_count(), 1);
        assert_eq!(h.notifier().count(), 1);

        let key = StorageKey {
            pk: "website#contact".to_string(),
            sk: "jane@example.com".to_string(),
        };
        let item = h.store().get("devtrolls", &key).unwrap();
        assert_eq!(item["timestamp"], timestamp);
        assert_eq!(item["phone"], "555-1234");

        let sent = h.notifier().sent.lock().unwrap();
        assert_eq!(sent[0].to.as_deref(), Some("operator@example.com"));
        assert_eq!(sent[0].subject, "New Contact Form Submission from Jane Smith");
        assert!(sent[0].html.contains("Interested."));
    }

    #[tokio::test]
    async fn test_application_resubmission_overwrites_key() {
        let h = handler();
        let first = json!({
            "job": "brand-manager",
            "name": "Jane Smith",
            "email": "  Jane@Example.com ",
            "statement": "First statement"
        });
        let second = json!({
            "job": "sales-leader",
            "name": "Jane Smith",
            "email": "JANE@example.COM",
            "statement": "Second statement"
        });

        let r1 = h.handle(FormKind::Application, &event(&first)).await;
        let r2 = h.handle(FormKind::Application, &event(&second)).await;
        assert_eq!(r1.status_code, 200);
        assert_eq!(r2.status_code, 200);

        let t1 = r1.body_json().unwrap()["timestamp"].as_i64().unwrap();
        let t2 = r2.body_json().unwrap()["timestamp"].as_i64().unwrap();
        assert!(t2 >= t1);

        assert_eq!(h.store().len("devtrolls"), 1);
        let key = StorageKey {
            pk: "website#careers#application".to_string(),
            sk: "jane@example.com".to_string(),
        };
        let item = h.store().get("devtrolls", &key).unwrap();
        assert_eq!(item["statement"], "Second statement");
        assert_eq!(item["job"], "sales-leader");

        let sent = h.notifier().sent.lock().unwrap();
        assert_eq!(sent[1].subject, "New Job Application: sales-leader from Jane Smith");
    }

    #[tokio::test]
    async fn test_malformed_body_is_500() {
        let h = handler();
        let resp = h.handle(FormKind::Contact, &FormEvent::new("{not json")).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(error_of(&resp), "Failed to process contact form");
    }

    #[tokio::test]
    async fn test_notifier_failure_is_500() {
        let h = SubmissionHandler::new(
            MemoryStore::default(),
            RecordingNotifier::failing(),
            config(),
        );
        let body = json!({"job": "customer-success", "name": "J", "email": "j@e.co", "statement": "s"});
        let resp = h.handle(FormKind::Application, &event(&body)).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(error_of(&resp), "Failed to process application");
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let h = SubmissionHandler::new(FailingStore, RecordingNotifier::default(), config());
        let body = json!({"name": "J", "email": "j@e.co", "message": "m"});
        let resp = h.handle(FormKind::Contact, &event(&body)).await;
        assert_eq!(resp.status_code, 500);
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_at_collaborator() {
        let h = SubmissionHandler::new(
            MemoryStore::default(),
            RecordingNotifier::default(),
            FormsConfig::default(),
        );
        let body = json!({"name": "J", "email": "j@e.co", "message": "m"});
        let resp = h.handle(FormKind::Contact, &event(&body)).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(h.store().put_count(), 0);
    }
}
