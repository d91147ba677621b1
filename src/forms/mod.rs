//! Website form intake
//!
//! Contact and job-application submissions share one pipeline: honeypot,
//! validation, record, then a parallel store + notify.

pub mod email;
pub mod event;
pub mod handler;
pub mod kind;
pub mod record;
pub mod routes;
pub mod spam;
pub mod validate;

pub use event::{FormEvent, FormResponse};
pub use handler::SubmissionHandler;
pub use kind::{FormKind, JobId};
pub use record::{StorageKey, Submission};
pub use routes::FormsService;
pub use validate::ValidationError;
