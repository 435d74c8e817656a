//! Layered HTTP transport.
//!
//! Every call goes through the same onion of stages, each wrapping the next:
//!
//! ```text
//! LoggingTransport        method, url, total elapsed time, failures
//!   RetryTransport        re-sends on transport failures only
//!     HeaderTransport     merges the fixed header set
//!       base transport    reqwest (or anything implementing `Transport`)
//! ```
//!
//! Stages only ever see [`HttpRequest`] / [`HttpResponse`], so a test can swap the base for an
//! in-memory fake and still exercise the whole stack.

mod header;
mod http;
mod logging;
mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::Dispatch;
use url::Url;

pub use header::HeaderTransport;
pub use http::ReqwestTransport;
pub use logging::LoggingTransport;
pub(crate) use logging::in_dispatch;
pub use retry::RetryTransport;

use crate::Result;
use crate::session::RetryPolicy;
use crate::types::{Headers, RequestMethod};

/// A fully validated request, ready to go on the wire.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: Headers,
    /// `None` sends no body at all.
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: RequestMethod, url: Url, headers: Headers, body: Option<String>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }
}

/// A response whose body has been read to the end.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }
}

/// A single HTTP round trip.
///
/// Implementations return `Kind::Transport` errors for network failures; those are the only ones
/// the retry stage re-sends. A response with a 4xx/5xx status is still `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

/// The full stack around a base transport.
pub type Pipeline<T> = LoggingTransport<RetryTransport<HeaderTransport<T>>>;

/// Wraps `base` in header injection, retry and logging, innermost first.
#[must_use]
pub fn pipeline<T: Transport>(
    base: T,
    headers: Headers,
    retry: RetryPolicy,
    dispatch: Option<Dispatch>,
) -> Pipeline<T> {
    let headers = HeaderTransport::new(base, headers);
    let retry = RetryTransport::new(headers, retry);
    LoggingTransport::new(retry, dispatch)
}
