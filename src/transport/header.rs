use async_trait::async_trait;

use crate::Result;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::types::Headers;

/// Adds a fixed set of headers to every request.
///
/// The fixed set overwrites a request header of the same (case-sensitive) name.
#[derive(Clone, Debug)]
pub struct HeaderTransport<T> {
    inner: T,
    headers: Headers,
}

impl<T> HeaderTransport<T> {
    #[must_use]
    pub fn new(inner: T, headers: Headers) -> Self {
        Self { inner, headers }
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[async_trait]
impl<T: Transport> Transport for HeaderTransport<T> {
    async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        request.headers.merge(&self.headers);
        self.inner.execute(request).await
    }
}
