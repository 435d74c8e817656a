use std::sync::Arc;

use bon::Builder;
use tracing::{debug, error, warn};
use url::Url;

use crate::Result;
use crate::error::Error;
use crate::transport::{HttpRequest, Transport};
use crate::types::{Headers, RequestMethod};

/// A request as assembled by the caller, before validation.
///
/// `body` is sent verbatim; an empty body means no body at all.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Builder)]
pub struct ApiRequest {
    pub method: Option<RequestMethod>,
    #[builder(into)]
    pub url: Option<String>,
    #[builder(into, default)]
    pub body: String,
    #[builder(default)]
    pub headers: Headers,
}

impl ApiRequest {
    /// Checks that a method and a URL are present.
    pub fn validate(&self) -> Result<()> {
        if self.method.is_none() {
            return Err(Error::validation("request method is required"));
        }
        if self.url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            return Err(Error::validation("request url is required"));
        }
        Ok(())
    }

    /// Validates and converts into a wire request.
    pub fn into_http(self) -> Result<HttpRequest> {
        self.validate()?;

        let (Some(method), Some(url)) = (self.method, self.url) else {
            return Err(Error::validation("request method and url are required"));
        };
        let url = Url::parse(&url).map_err(|e| Error::from(e).with_context(format!("url `{url}`")))?;
        let body = (!self.body.is_empty()).then_some(self.body);

        Ok(HttpRequest {
            method,
            url,
            headers: self.headers,
            body,
        })
    }
}

/// Runs [`ApiRequest`]s through a transport and hands back the raw response body.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Validates `request`, sends it and reads the whole body.
    ///
    /// Validation and URL errors are returned before anything is sent. Non-2xx statuses are not
    /// errors here; the body is returned so the caller can decode the API's own error envelope.
    pub async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let request = request.into_http().inspect_err(|err| {
            error!(error = %err, "invalid request");
        })?;
        let method = request.method;
        let url = request.url.clone();

        let response = self.transport.execute(request).await.map_err(|err| {
            error!(%method, %url, error = %err, "failed to execute request");
            err.with_context(format!("{method} {url}"))
        })?;

        if response.status.is_success() {
            debug!(%method, %url, status = %response.status, "request completed");
        } else {
            warn!(%method, %url, status = %response.status, "request completed with error status");
        }

        Ok(response.body)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}
