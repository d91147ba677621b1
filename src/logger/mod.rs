//! Logger module
//!
//! Provides logging utilities for both servers including:
//! - Server lifecycle logging
//! - Access logging
//! - Spam and submission failure logging
//! - Preview server reload events

pub mod writer;

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::forms::spam::SpamReport;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        &config.logging.level,
        writer::LogFormat::parse(&config.logging.format),
        config.logging.log_file.as_deref(),
    )
}

pub fn log_server_start(name: &str, addr: &SocketAddr, config: &Config) {
    info!("======================================");
    info!("{name} started successfully");
    info!("Listening on: http://{addr}");
    info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        info!("Log file: {path}");
    }
    info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    error!("{message}");
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}

pub fn log_access(method: &str, path: &str, status: u16, elapsed: Duration) {
    info!(
        method,
        path,
        status,
        request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "Request handled"
    );
}

pub fn log_shutdown(name: &str) {
    info!("{name} shutting down");
}

/// Outcome of draining in-flight connections; `abandoned` were still open at the deadline
pub fn log_drain_finished(name: &str, abandoned: usize) {
    if abandoned == 0 {
        info!("{name} stopped, all connections closed");
    } else {
        warn!(abandoned, "{name} stopped with connections still open");
    }
}

/// Forensic record of a rejected honeypot submission
pub fn log_spam_blocked(report: &SpamReport) {
    warn!(
        ip = %report.ip,
        user_agent = %report.user_agent,
        timestamp = %report.timestamp,
        data = %report.data,
        "Spam blocked"
    );
}

pub fn log_submission_failed(form: &str, err: &anyhow::Error) {
    error!(form, "Error processing {form}: {err:#}");
}

pub fn log_submission_stored(form: &str, timestamp: i64) {
    info!(form, timestamp, "Submission stored and notification sent");
}

pub fn log_templates_found(count: usize) {
    info!("Found {count} template(s)");
}

pub fn log_template_changed(path: &std::path::Path, clients: usize) {
    info!(
        path = %path.display(),
        clients,
        "Template changed, reloading"
    );
}

pub fn log_sse_client(connected: bool, open: usize) {
    if connected {
        debug!(open, "Live reload client connected");
    } else {
        debug!(open, "Live reload client disconnected");
    }
}
