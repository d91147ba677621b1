//! Email template preview server
//!
//! Serves every template under the routes tree rendered with placeholder data,
//! and reloads open browser tabs over Server-Sent Events when a template
//! changes on disk.

pub mod discovery;
pub mod placeholder;
pub mod render;
pub mod sse;
pub mod watch;

use std::cell::RefCell;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response};

use crate::http::{self, ResponseBody};
use crate::logger;
use crate::server::Service;
use discovery::TemplateEntry;
use sse::SseRegistry;

pub use watch::watch_templates;

pub const NOT_FOUND_MESSAGE: &str = "Template not found";

pub struct PreviewServer {
    routes_dir: PathBuf,
    template_suffix: String,
    templates: RefCell<Vec<TemplateEntry>>,
    registry: Arc<SseRegistry>,
    access_log: bool,
}

impl PreviewServer {
    /// Scan `routes_dir` and build a server for the templates found
    pub fn new(
        routes_dir: impl Into<PathBuf>,
        template_suffix: impl Into<String>,
        access_log: bool,
    ) -> std::io::Result<Self> {
        let routes_dir = routes_dir.into();
        let template_suffix = template_suffix.into();
        let templates = discovery::discover(&routes_dir, &template_suffix)?;
        logger::log_templates_found(templates.len());

        Ok(Self {
            routes_dir,
            template_suffix,
            templates: RefCell::new(templates),
            registry: SseRegistry::new(),
            access_log,
        })
    }

    pub fn routes_dir(&self) -> &Path {
        &self.routes_dir
    }

    pub fn template_suffix(&self) -> &str {
        &self.template_suffix
    }

    pub const fn registry(&self) -> &Arc<SseRegistry> {
        &self.registry
    }

    pub fn templates(&self) -> Vec<TemplateEntry> {
        self.templates.borrow().clone()
    }

    /// Rescan the routes tree, then tell every open tab to reload.
    ///
    /// A failed rescan keeps the previous template list.
    pub fn reload(&self) -> usize {
        match discovery::discover(&self.routes_dir, &self.template_suffix) {
            Ok(found) => {
                if found.len() != self.templates.borrow().len() {
                    logger::log_templates_found(found.len());
                }
                *self.templates.borrow_mut() = found;
            }
            Err(err) => logger::log_error(&format!(
                "Failed to rescan {}: {err}",
                self.routes_dir.display()
            )),
        }
        self.registry.broadcast_reload()
    }

    /// Route one request by path
    pub fn route(&self, path: &str) -> Response<ResponseBody> {
        match path {
            "" | "/" => http::build_html_response(render::homepage(&self.templates.borrow())),
            "/sse" => {
                http::build_event_stream_response(self.registry.connect().boxed_unsync())
            }
            _ => {
                let url = path.strip_prefix('/').unwrap_or(path);
                let found = self
                    .templates
                    .borrow()
                    .iter()
                    .find(|t| t.url == url)
                    .map(|t| t.path.clone());
                match found {
                    Some(template) => http::build_html_response(render::render_preview(&template)),
                    None => http::build_404_response(NOT_FOUND_MESSAGE),
                }
            }
        }
    }
}

impl Service for PreviewServer {
    async fn call(&self, req: Request<Incoming>, _peer: SocketAddr) -> Response<ResponseBody> {
        let start = Instant::now();
        let resp = self.route(req.uri().path());
        if self.access_log {
            logger::log_access(
                req.method().as_str(),
                req.uri().path(),
                resp.status().as_u16(),
                start.elapsed(),
            );
        }
        resp
    }

    // Event streams never finish by themselves and would hold the drain open
    fn on_shutdown(&self) {
        self.registry.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    const CONTACT: &str = r#"<html><body><h1>{{ name }}</h1><p>{{ phone | default(value="Not provided") }}</p></body></html>"#;

    fn setup() -> (tempfile::TempDir, PreviewServer) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact/send/contact.email.html");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, CONTACT).unwrap();
        let server = PreviewServer::new(dir.path(), ".email.html", false).unwrap();
        (dir, server)
    }

    async fn text(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_homepage() {
        let (_dir, server) = setup();
        let resp = server.route("/");
        assert_eq!(resp.status(), StatusCode::OK);
        let html = text(resp).await;
        assert!(html.contains("Email Templates (1)"));
        let url = tera::escape_html("contact/send/contact");
        assert!(html.contains(&format!("href=\"/{url}\"")));
    }

    #[tokio::test]
    async fn test_template_renders_placeholders() {
        let (_dir, server) = setup();
        let resp = server.route("/contact/send/contact");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        let html = text(resp).await;
        assert!(html.contains("<h1>${name}</h1>"));
        assert!(html.contains("<p>${phone}</p>"));
        assert!(html.contains("EventSource('/sse')"));
    }

    #[tokio::test]
    async fn test_edits_show_without_restart() {
        let (dir, server) = setup();
        let path = dir.path().join("contact/send/contact.email.html");
        std::fs::write(&path, "<html><body>edited {{ email }}</body></html>").unwrap();
        let html = text(server.route("/contact/send/contact")).await;
        assert!(html.contains("edited ${email}"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (_dir, server) = setup();
        let resp = server.route("/contact/send");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Content-Type"], "text/plain");
        assert_eq!(text(resp).await, NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_sse_registers_until_dropped() {
        let (_dir, server) = setup();
        let resp = server.route("/sse");
        assert_eq!(resp.headers()["Content-Type"], "text/event-stream");
        assert_eq!(server.registry().len(), 1);
        drop(resp);
        assert!(server.registry().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_ends_event_streams() {
        let (_dir, server) = setup();
        let resp = server.route("/sse");
        server.on_shutdown();
        assert!(server.registry().is_empty());
        assert_eq!(text(resp).await, ": connected\n\n");
    }

    #[test]
    fn test_reload_picks_up_new_templates() {
        let (dir, server) = setup();
        let path = dir.path().join("careers/apply/application.email.html");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, CONTACT).unwrap();

        let _stream = server.route("/sse");
        assert_eq!(server.reload(), 1);
        let urls: Vec<String> = server.templates().into_iter().map(|t| t.url).collect();
        assert_eq!(urls, ["careers/apply/application", "contact/send/contact"]);
    }
}
