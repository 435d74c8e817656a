use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::header::{HeaderName, HeaderValue};

use crate::Result;
use crate::error::{Error, Kind};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Base transport backed by a [`reqwest::Client`].
///
/// Connection reuse and TLS are left entirely to reqwest. Note that the `http` crate stores header
/// names lowercased, so the casing kept by [`Headers`](crate::Headers) ends at this boundary.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::with_source(Kind::Internal, e).with_context("build http client"))?;

        Ok(Self::with_client(client))
    }

    /// Uses an already configured client, e.g. one with a proxy.
    #[must_use]
    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), request.url);

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::with_source(Kind::Construction, e).with_context(format!("header `{name}`"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::with_source(Kind::Construction, e).with_context(format!("header `{name}`"))
            })?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let kind = if e.is_builder() {
                Kind::Construction
            } else {
                Kind::Transport
            };
            Error::with_source(kind, e)
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::with_source(Kind::Body, e))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
