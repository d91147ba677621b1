//! Request helpers: client metadata and bounded body reads

use std::net::SocketAddr;

use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::HeaderMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {0} bytes")]
    TooLarge(u64),
    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Collect a request body, refusing anything over `max_body_size` bytes.
///
/// A declared `Content-Length` over the limit is rejected before reading.
pub async fn read_body_limited<B>(
    headers: &HeaderMap,
    body: B,
    max_body_size: u64,
) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let declared = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|size| size > max_body_size) {
        return Err(BodyError::TooLarge(max_body_size));
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => {
            Err(BodyError::TooLarge(max_body_size))
        }
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}

/// Originating client address: first `X-Forwarded-For` hop, else the peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .or_else(|| peer.map(|p| p.ip().to_string()))
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
