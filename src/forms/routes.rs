//! HTTP routing for the forms server
//!
//! Maps hyper requests onto [`FormEvent`]s and [`FormResponse`]s back onto
//! hyper responses.

use std::net::SocketAddr;
use std::time::Instant;

use hyper::body::{Body, Bytes, Incoming};
use hyper::{Method, Request, Response};

use super::event::{FormEvent, FormResponse};
use super::handler::SubmissionHandler;
use super::kind::FormKind;
use crate::config::HttpConfig;
use crate::http::{self, BodyError, ResponseBody};
use crate::logger;
use crate::notifier::Notifier;
use crate::server::Service;
use crate::store::SubmissionStore;

pub struct FormsService<S, N> {
    handler: SubmissionHandler<S, N>,
    http: HttpConfig,
    access_log: bool,
}

impl<S, N> FormsService<S, N>
where
    S: SubmissionStore,
    N: Notifier,
{
    pub const fn new(handler: SubmissionHandler<S, N>, http: HttpConfig, access_log: bool) -> Self {
        Self {
            handler,
            http,
            access_log,
        }
    }

    pub const fn handler(&self) -> &SubmissionHandler<S, N> {
        &self.handler
    }

    /// Route one request
    pub async fn route<B>(&self, req: Request<B>, peer: Option<SocketAddr>) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes>,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let resp = match FormKind::from_path(&path) {
            None => self.to_http(&FormResponse::error(404, "Not found")),
            Some(kind) => match method {
                Method::POST => self.submit(kind, req, peer).await,
                Method::OPTIONS => http::build_options_response(self.http.enable_cors),
                _ => http::build_405_response("POST, OPTIONS"),
            },
        };

        if self.access_log {
            logger::log_access(method.as_str(), &path, resp.status().as_u16(), start.elapsed());
        }
        resp
    }

    async fn submit<B>(
        &self,
        kind: FormKind,
        req: Request<B>,
        peer: Option<SocketAddr>,
    ) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes>,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let (parts, body) = req.into_parts();
        let bytes = match http::read_body_limited(&parts.headers, body, self.http.max_body_size).await
        {
            Ok(bytes) => bytes,
            Err(BodyError::TooLarge(_)) => return http::build_413_response(),
            Err(err @ BodyError::Read(_)) => {
                logger::log_warning(&err.to_string());
                return self.to_http(&FormResponse::error(400, "Unable to read request body"));
            }
        };

        let body = match String::from_utf8(bytes.to_vec()) {
            Ok(body) => body,
            Err(err) => {
                let err = anyhow::Error::new(err).context("request body is not valid UTF-8");
                logger::log_submission_failed(kind.label(), &err);
                return self.to_http(&FormResponse::error(500, kind.failure_message()));
            }
        };

        let event = FormEvent {
            body,
            source_ip: http::client_ip(&parts.headers, peer),
            user_agent: http::user_agent(&parts.headers),
        };

        let resp = self.handler.handle(kind, &event).await;
        self.to_http(&resp)
    }

    fn to_http(&self, resp: &FormResponse) -> Response<ResponseBody> {
        let mut out =
            http::build_json_response(resp.status_code, resp.body.clone(), self.http.enable_cors);
        for (name, value) in &resp.headers {
            if let (Ok(name), Ok(value)) = (
                hyper::header::HeaderName::try_from(name.as_str()),
                hyper::header::HeaderValue::try_from(value.as_str()),
            ) {
                out.headers_mut().insert(name, value);
            }
        }
        out
    }
}

impl<S, N> Service for FormsService<S, N>
where
    S: SubmissionStore + 'static,
    N: Notifier + 'static,
{
    async fn call(&self, req: Request<Incoming>, peer: SocketAddr) -> Response<ResponseBody> {
        self.route(req, Some(peer)).await
    }
}
