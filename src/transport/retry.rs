use async_trait::async_trait;
use tracing::warn;

use crate::Result;
use crate::error::Kind;
use crate::session::RetryPolicy;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Re-sends a request after transport-level failures.
///
/// Only `Kind::Transport` errors are retried. Any response that made it back, whatever its status,
/// is returned as is. The policy delay is slept between attempts, not after the last one.
#[derive(Clone, Debug)]
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryTransport<T> {
    #[must_use]
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.execute(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.kind() == Kind::Transport && attempt < max_attempts => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        max_attempts,
                        error = %err,
                        "transport failure, retrying"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(err) if err.kind() == Kind::Transport => {
                    return Err(err.with_context(format!("gave up after {attempt} attempt(s)")));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
