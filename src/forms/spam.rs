//! Honeypot spam detection
//!
//! Both forms render a hidden `website` input that people never see and naive
//! bots fill in. A populated decoy marks the submission as spam; the request
//! metadata is logged so blocklists can be tuned later.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use super::event::FormEvent;
use crate::logger;

/// Name of the decoy field in both forms
pub const HONEYPOT_FIELD: &str = "website";

/// What gets logged when a submission trips the honeypot
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpamReport {
    pub ip: String,
    pub user_agent: String,
    pub timestamp: String,
    pub data: Value,
}

impl SpamReport {
    pub fn from_event(event: &FormEvent) -> Self {
        let data = serde_json::from_str(&event.body)
            .unwrap_or_else(|_| Value::String(event.body.clone()));
        Self {
            ip: non_empty_or_unknown(event.source_ip.as_deref()),
            user_agent: non_empty_or_unknown(event.user_agent.as_deref()),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
        }
    }
}

/// Returns true, and logs a [`SpamReport`], when the decoy field is populated
pub fn is_spam(honeypot: Option<&Value>, event: &FormEvent) -> bool {
    if honeypot.is_some_and(is_populated) {
        logger::log_spam_blocked(&SpamReport::from_event(event));
        return true;
    }
    false
}

/// Loose "has a value" test for the decoy: `null`, `false`, `0` and `""` are empty
fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty_or_unknown(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
