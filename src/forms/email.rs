//! Notification email composition
//!
//! The production templates live in the routes tree next to the endpoints
//! that use them; they are compiled into the binary here and read from disk
//! by the preview server. Rendering goes through tera with autoescaping, so
//! submitted text never reaches the email as markup.

use std::sync::LazyLock;

use anyhow::{anyhow, Context as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use super::kind::FormKind;
use super::record::{ApplicationRecord, ContactRecord, Stamp, Submission};
use crate::config::FormsConfig;
use crate::notifier::OutgoingEmail;

const CONTACT_TEMPLATE: &str = include_str!("../../routes/contact/send/contact.email.html");
const APPLICATION_TEMPLATE: &str =
    include_str!("../../routes/careers/apply/application.email.html");

static TEMPLATES: LazyLock<tera::Result<Tera>> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name(FormKind::Contact), CONTACT_TEMPLATE)?;
    tera.add_raw_template(template_name(FormKind::Application), APPLICATION_TEMPLATE)?;
    Ok(tera)
});

/// Registered template name; the `.html` suffix turns autoescaping on
pub const fn template_name(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Contact => "contact.email.html",
        FormKind::Application => "application.email.html",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactEmail<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    message: &'a str,
    submitted_at: String,
}

impl<'a> From<&'a ContactRecord> for ContactEmail<'a> {
    fn from(r: &'a ContactRecord) -> Self {
        Self {
            name: &r.name,
            email: &r.email,
            phone: r.phone.as_deref(),
            message: &r.message,
            submitted_at: submitted_at(&r.stamp),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationEmail<'a> {
    job_title: &'static str,
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    linkedin: Option<&'a str>,
    statement: &'a str,
    submitted_at: String,
}

impl<'a> From<&'a ApplicationRecord> for ApplicationEmail<'a> {
    fn from(r: &'a ApplicationRecord) -> Self {
        Self {
            job_title: r.job.title(),
            name: &r.name,
            email: &r.email,
            linkedin: r.linkedin.as_deref(),
            statement: &r.statement,
            submitted_at: submitted_at(&r.stamp),
        }
    }
}

/// Human-readable submission time shown at the bottom of each email
fn submitted_at(stamp: &Stamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(stamp.timestamp)
        .map(|dt| dt.format("%B %-d, %Y at %-I:%M %p UTC").to_string())
        .unwrap_or_else(|| stamp.created_at.clone())
}

/// Render the HTML body for a submission
pub fn render_body(submission: &Submission) -> anyhow::Result<String> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| anyhow!("email templates failed to load: {e}"))?;
    let context = match submission {
        Submission::Contact(r) => Context::from_serialize(ContactEmail::from(r))?,
        Submission::Application(r) => Context::from_serialize(ApplicationEmail::from(r))?,
    };
    let kind = submission.kind();
    tera.render(template_name(kind), &context)
        .with_context(|| format!("failed to render {} email", kind.label()))
}

/// Full operator email for a submission
pub fn compose(submission: &Submission, config: &FormsConfig) -> anyhow::Result<OutgoingEmail> {
    Ok(OutgoingEmail {
        from: config.from_email.clone(),
        to: config.to_email.clone(),
        subject: submission.subject(),
        html: render_body(submission)?,
    })
}
