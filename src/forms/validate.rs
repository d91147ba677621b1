//! Submission validation
//!
//! Each form has one validator that maps the raw JSON payload to a normalized
//! record or to the first rule it breaks. Rules run in a fixed order and stop
//! at the first failure, so a payload breaking two rules always reports the
//! earlier one. The honeypot check runs before any of these, in the handler.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::kind::JobId;
use super::record::{ApplicationRecord, ContactRecord, Stamp, Submission};

pub const NAME_MAX: usize = 350;
pub const EMAIL_MAX: usize = 450;
pub const MESSAGE_MAX: usize = 5500;
pub const LINKEDIN_MAX: usize = 500;
pub const STATEMENT_MAX: usize = 10_000;

/// Deliberately lax: one `@`, no whitespace, a dot somewhere in the domain
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// First rule a submission failed; `Display` is the message shown to the user
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name is too long (max 350 characters)")]
    NameTooLong,
    #[error("Valid email is required")]
    EmailInvalid,
    #[error("Email is too long (max 450 characters)")]
    EmailTooLong,
    #[error("Message is required")]
    MessageRequired,
    #[error("Message is too long (max 5500 characters)")]
    MessageTooLong,
    #[error("Please select a valid job position")]
    InvalidJob,
    #[error("LinkedIn/Website URL is too long (max 500 characters)")]
    LinkedinTooLong,
    #[error("Application statement is required")]
    StatementRequired,
    #[error("Application statement is too long (max 10000 characters)")]
    StatementTooLong,
}

/// Validate a contact form payload
pub fn validate_contact(
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<Submission, ValidationError> {
    let name = required(
        payload,
        "name",
        NAME_MAX,
        ValidationError::NameRequired,
        ValidationError::NameTooLong,
    )?;
    let email = email(payload)?;
    let message = required(
        payload,
        "message",
        MESSAGE_MAX,
        ValidationError::MessageRequired,
        ValidationError::MessageTooLong,
    )?;

    Ok(Submission::Contact(ContactRecord {
        name,
        email,
        phone: optional(payload, "phone"),
        message,
        stamp: Stamp::at(now),
    }))
}

/// Validate a job application payload
pub fn validate_application(
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<Submission, ValidationError> {
    let job = text(payload, "job")
        .and_then(|id| JobId::from_str(id).ok())
        .ok_or(ValidationError::InvalidJob)?;
    let name = required(
        payload,
        "name",
        NAME_MAX,
        ValidationError::NameRequired,
        ValidationError::NameTooLong,
    )?;
    let email = email(payload)?.to_lowercase();
    let linkedin = optional(payload, "linkedin");
    if linkedin.as_deref().is_some_and(|l| char_len(l) > LINKEDIN_MAX) {
        return Err(ValidationError::LinkedinTooLong);
    }
    let statement = required(
        payload,
        "statement",
        STATEMENT_MAX,
        ValidationError::StatementRequired,
        ValidationError::StatementTooLong,
    )?;

    Ok(Submission::Application(ApplicationRecord {
        job,
        name,
        email,
        linkedin,
        statement,
        stamp: Stamp::at(now),
    }))
}

/// String field as sent; non-string values count as absent
fn text<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

/// Trimmed, non-empty, at most `max` characters
fn required(
    payload: &Value,
    field: &str,
    max: usize,
    missing: ValidationError,
    too_long: ValidationError,
) -> Result<String, ValidationError> {
    let value = text(payload, field).map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(missing);
    }
    if char_len(value) > max {
        return Err(too_long);
    }
    Ok(value.to_string())
}

/// Trimmed value of an optional field; empty input is stored as absent
fn optional(payload: &Value, field: &str) -> Option<String> {
    text(payload, field)
        .filter(|v| !v.is_empty())
        .map(|v| v.trim().to_string())
}

fn email(payload: &Value) -> Result<String, ValidationError> {
    let value = text(payload, "email").map(str::trim).unwrap_or_default();
    if !RE_EMAIL.is_match(value) {
        return Err(ValidationError::EmailInvalid);
    }
    if char_len(value) > EMAIL_MAX {
        return Err(ValidationError::EmailTooLong);
    }
    Ok(value.to_string())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_123).unwrap()
    }

    fn contact_err(payload: &Value) -> ValidationError {
        validate_contact(payload, now()).unwrap_err()
    }

    fn application_err(payload: &Value) -> ValidationError {
        validate_application(payload, now()).unwrap_err()
    }

    #[test]
    fn test_contact_valid_is_trimmed() {
        let payload = json!({
            "name": "  Jane Smith ",
            "email": " Jane@Example.com ",
            "phone": " 555-1234 ",
            "message": "\tInterested.\n"
        });
        let Submission::Contact(record) = validate_contact(&payload, now()).unwrap() else {
            panic!("expected contact record");
        };
        assert_eq!(record.name, "Jane Smith");
        // Contact emails keep their case
        assert_eq!(record.email, "Jane@Example.com");
        assert_eq!(record.phone.as_deref(), Some("555-1234"));
        assert_eq!(record.message, "Interested.");
        assert_eq!(record.stamp.timestamp, 1_700_000_000_123);
        assert_eq!(record.stamp.created_at, "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_contact_invalid_email() {
        let payload = json!({"name": "John Doe", "email": "john#noatsymbol.com", "message": "x"});
        assert_eq!(contact_err(&payload), ValidationError::EmailInvalid);
        assert_eq!(contact_err(&payload).to_string(), "Valid email is required");
    }

    #[test]
    fn test_required_fields_reject_whitespace() {
        let base = json!({"name": "Jane", "email": "jane@example.com", "message": "Hi"});
        for (field, expected) in [
            ("name", ValidationError::NameRequired),
            ("email", ValidationError::EmailInvalid),
            ("message", ValidationError::MessageRequired),
        ] {
            let mut payload = base.clone();
            payload[field] = json!("   ");
            assert_eq!(contact_err(&payload), expected, "field {field}");
            payload.as_object_mut().unwrap().remove(field);
            assert_eq!(contact_err(&payload), expected, "field {field} absent");
        }
    }

    #[test]
    fn test_non_string_field_counts_as_missing() {
        let payload = json!({"name": 42, "email": "jane@example.com", "message": "Hi"});
        assert_eq!(contact_err(&payload), ValidationError::NameRequired);
    }

    #[test]
    fn test_first_failure_wins() {
        let payload = json!({"name": "", "email": "bad", "message": ""});
        assert_eq!(contact_err(&payload), ValidationError::NameRequired);

        let payload = json!({"job": "fake-job", "name": "", "email": "bad", "statement": ""});
        assert_eq!(application_err(&payload), ValidationError::InvalidJob);
    }

    #[test]
    fn test_length_boundaries() {
        let at = |n: usize| "a".repeat(n);
        let padded = |n: usize| format!("  {}  ", "é".repeat(n));

        let ok = json!({"name": at(NAME_MAX), "email": "a@b.co", "message": padded(MESSAGE_MAX)});
        assert!(validate_contact(&ok, now()).is_ok());

        let long_name = json!({"name": at(NAME_MAX + 1), "email": "a@b.co", "message": "x"});
        assert_eq!(contact_err(&long_name), ValidationError::NameTooLong);

        let long_msg = json!({"name": "a", "email": "a@b.co", "message": at(MESSAGE_MAX + 1)});
        assert_eq!(contact_err(&long_msg), ValidationError::MessageTooLong);

        let email = |n: usize| format!("{}@b.co", "a".repeat(n - 5));
        let ok = json!({"name": "a", "email": email(EMAIL_MAX), "message": "x"});
        assert!(validate_contact(&ok, now()).is_ok());
        let long_email = json!({"name": "a", "email": email(EMAIL_MAX + 1), "message": "x"});
        assert_eq!(contact_err(&long_email), ValidationError::EmailTooLong);
    }

    #[test]
    fn test_email_pattern() {
        for good in ["a@b.co", "first.last+tag@sub.example.org", "x@y.z"] {
            let payload = json!({"name": "a", "email": good, "message": "x"});
            assert!(validate_contact(&payload, now()).is_ok(), "{good}");
        }
        for bad in ["a@b", "a b@c.d", "@b.co", "a@@b.co", "a@b.", "plain"] {
            let payload = json!({"name": "a", "email": bad, "message": "x"});
            assert_eq!(contact_err(&payload), ValidationError::EmailInvalid, "{bad}");
        }
    }

    #[test]
    fn test_application_valid_lowercases_email() {
        let payload = json!({
            "job": "brand-manager",
            "name": "Jane Smith",
            "email": "  Jane@Example.COM ",
            "linkedin": " https://linkedin.com/in/janesmith ",
            "statement": " I like carbon nanotubes. "
        });
        let Submission::Application(record) = validate_application(&payload, now()).unwrap()
        else {
            panic!("expected application record");
        };
        assert_eq!(record.job, JobId::BrandManager);
        assert_eq!(record.email, "jane@example.com");
        assert_eq!(
            record.linkedin.as_deref(),
            Some("https://linkedin.com/in/janesmith")
        );
        assert_eq!(record.statement, "I like carbon nanotubes.");
    }

    #[test]
    fn test_application_invalid_job() {
        let payload = json!({"job": "fake-job", "name": "John", "email": "john@example.com", "statement": "hi"});
        assert_eq!(application_err(&payload), ValidationError::InvalidJob);
        assert_eq!(
            application_err(&payload).to_string(),
            "Please select a valid job position"
        );

        let missing = json!({"name": "John", "email": "john@example.com", "statement": "hi"});
        assert_eq!(application_err(&missing), ValidationError::InvalidJob);
    }

    #[test]
    fn test_application_linkedin_bounds() {
        let payload = |linkedin: String| {
            json!({"job": "sales-leader", "name": "J", "email": "j@e.co", "linkedin": linkedin, "statement": "hi"})
        };
        assert!(validate_application(&payload("a".repeat(LINKEDIN_MAX)), now()).is_ok());
        assert_eq!(
            application_err(&payload("a".repeat(LINKEDIN_MAX + 1))),
            ValidationError::LinkedinTooLong
        );
    }

    #[test]
    fn test_application_statement_bounds() {
        let payload = |statement: String| {
            json!({"job": "customer-success", "name": "J", "email": "j@e.co", "statement": statement})
        };
        assert!(validate_application(&payload("s".repeat(STATEMENT_MAX)), now()).is_ok());
        assert_eq!(
            application_err(&payload("s".repeat(STATEMENT_MAX + 1))),
            ValidationError::StatementTooLong
        );
        assert_eq!(
            application_err(&payload(String::new())),
            ValidationError::StatementRequired
        );
    }

    #[test]
    fn test_empty_optional_fields_are_absent() {
        let payload = json!({"name": "a", "email": "a@b.co", "phone": "", "message": "x"});
        let Submission::Contact(record) = validate_contact(&payload, now()).unwrap() else {
            panic!("expected contact record");
        };
        assert_eq!(record.phone, None);
    }
}
