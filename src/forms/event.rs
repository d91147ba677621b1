//! Transport-neutral request and response shapes
//!
//! Any HTTP entry point can drive the submission handler by building a
//! [`FormEvent`] and writing back the [`FormResponse`]. The response serializes
//! in the API gateway proxy shape (`statusCode`, `headers`, `body`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound submission with the metadata the spam filter records
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FormEvent {
    pub body: String,
    #[serde(default)]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl FormEvent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FormResponse {
    /// JSON response with the given status
    pub fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// `{"error": message}`
    pub fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &serde_json::json!({ "error": message }))
    }

    /// Parsed body, for callers that inspect the payload
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}
