//! Website form intake and email template preview.
//!
//! Two binaries share this library: `site_forms` serves the contact and
//! careers endpoints, `preview_server` renders the notification templates
//! with live reload during development.

pub mod config;
pub mod forms;
pub mod http;
pub mod logger;
pub mod notifier;
pub mod preview;
pub mod server;
pub mod store;
