use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use tracing::instrument::WithSubscriber as _;
use tracing::{Dispatch, debug, error, info};

use crate::Result;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Logs every call that passes through it.
///
/// Sitting outside the retry stage, the elapsed time it reports covers all attempts. Events go to
/// `dispatch` when one is injected and to the default subscriber otherwise.
#[derive(Clone, Debug)]
pub struct LoggingTransport<T> {
    inner: T,
    dispatch: Option<Dispatch>,
}

impl<T: Transport> LoggingTransport<T> {
    #[must_use]
    pub fn new(inner: T, dispatch: Option<Dispatch>) -> Self {
        Self { inner, dispatch }
    }

    async fn logged(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let started = Instant::now();

        info!(%method, %url, "sending request");
        debug!(
            %method,
            %url,
            headers = ?request.headers,
            body_len = request.body.as_ref().map_or(0, String::len),
            "request detail"
        );

        let result = self.inner.execute(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(response) => info!(
                %method,
                %url,
                status = %response.status,
                elapsed_ms,
                "response received"
            ),
            Err(err) => error!(%method, %url, elapsed_ms, error = %err, "request failed"),
        }

        result
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        in_dispatch(self.dispatch.as_ref(), self.logged(request)).await
    }
}

/// Runs `future` with `dispatch` as its subscriber, if there is one.
pub(crate) async fn in_dispatch<F: Future>(dispatch: Option<&Dispatch>, future: F) -> F::Output {
    match dispatch {
        Some(dispatch) => future.with_subscriber(dispatch.clone()).await,
        None => future.await,
    }
}
