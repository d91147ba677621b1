//! HTTP response building module
//!
//! Provides builders for the responses both servers send, decoupled from
//! specific business logic.

use std::convert::Infallible;

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Body type shared by every response; streaming bodies box into it too
pub type ResponseBody = UnsyncBoxBody<Bytes, Infallible>;

/// Box a complete in-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).boxed_unsync()
}

/// Build 404 Not Found response with a plain text message
pub fn build_404_response(message: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(full(message))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full(message))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", allow)
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "POST, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(full(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(full(Bytes::new()))
    })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "text/plain")
        .body(full("413 Payload Too Large"))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(full("413 Payload Too Large"))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String) -> Response<ResponseBody> {
    let content_length = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(full(content))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(full(Bytes::new()))
        })
}

/// Build JSON response from an already serialized body
pub fn build_json_response(status: u16, body: String, enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    if enable_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }
    builder.body(full(body)).unwrap_or_else(|e| {
        log_build_error("JSON", &e);
        let mut resp = Response::new(full(r#"{"error":"Internal server error"}"#));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    })
}

/// Build the headers of a Server-Sent Events stream around `body`
pub fn build_event_stream_response(body: ResponseBody) -> Response<ResponseBody> {
    let mut resp = Response::new(body);
    let headers = resp.headers_mut();
    headers.insert(
        "Content-Type",
        hyper::header::HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(
        "Cache-Control",
        hyper::header::HeaderValue::from_static("no-cache"),
    );
    headers.insert(
        "Connection",
        hyper::header::HeaderValue::from_static("keep-alive"),
    );
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
