//! Normalized submission records
//!
//! A record is built once per request after validation passes and is never
//! mutated afterwards. It knows its own storage key and email subject.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::kind::{FormKind, JobId};

/// Composite key under which a record is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StorageKey {
    pub pk: String,
    pub sk: String,
}

/// Creation instant shared by `timestamp` and `createdAt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// ISO-8601 with millisecond precision and `Z` suffix
    pub created_at: String,
}

impl Stamp {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            timestamp: instant.timestamp_millis(),
            created_at: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    #[serde(flatten)]
    pub stamp: Stamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub job: JobId,
    pub name: String,
    pub email: String,
    pub linkedin: Option<String>,
    pub statement: String,
    #[serde(flatten)]
    pub stamp: Stamp,
}

/// A validated submission of either form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Contact(ContactRecord),
    Application(ApplicationRecord),
}

impl Submission {
    pub const fn kind(&self) -> FormKind {
        match self {
            Self::Contact(_) => FormKind::Contact,
            Self::Application(_) => FormKind::Application,
        }
    }

    pub const fn stamp(&self) -> &Stamp {
        match self {
            Self::Contact(r) => &r.stamp,
            Self::Application(r) => &r.stamp,
        }
    }

    /// Partition per form, sort key is the normalized email, so a repeat
    /// submission from the same address replaces the earlier one.
    pub fn storage_key(&self) -> StorageKey {
        let sk = match self {
            Self::Contact(r) => r.email.clone(),
            Self::Application(r) => r.email.clone(),
        };
        StorageKey {
            pk: self.kind().partition_key().to_string(),
            sk,
        }
    }

    /// Attribute map written to storage: the key plus every record field
    pub fn to_item(&self) -> Map<String, Value> {
        let key = self.storage_key();
        let mut item = Map::new();
        item.insert("pk".to_string(), Value::String(key.pk));
        item.insert("sk".to_string(), Value::String(key.sk));

        let fields = match self {
            Self::Contact(r) => serde_json::to_value(r),
            Self::Application(r) => serde_json::to_value(r),
        };
        if let Ok(Value::Object(fields)) = fields {
            item.extend(fields);
        }
        item
    }

    /// Email subject line for the operator notification
    pub fn subject(&self) -> String {
        match self {
            Self::Contact(r) => format!("New Contact Form Submission from {}", r.name),
            Self::Application(r) => format!("New Job Application: {} from {}", r.job, r.name),
        }
    }
}
