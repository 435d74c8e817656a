use std::time::Duration;

use bon::bon;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use tracing::Dispatch;
use url::Url;

use crate::Result;
use crate::error::Error;
use crate::session::policy::RetryPolicy;
use crate::types::Headers;
use crate::{API_URL, LOGIN_URL};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw configuration values typically read from an application config file.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct RawClientConfig {
    pub app_key: String,
    pub app_secret: SecretString,
    #[serde(default)]
    pub session_key: Option<SecretString>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
}

/// Client configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub login_url: Url,
    pub app_key: String,
    pub app_secret: SecretString,
    pub session_key: Option<SecretString>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Headers the transport adds to every request.
    pub default_headers: Headers,
    /// Where log events go; the default subscriber when `None`.
    pub dispatch: Option<Dispatch>,
}

#[bon]
impl ClientConfig {
    #[builder]
    pub fn new(
        #[builder(into)] app_key: String,
        #[builder(into)] app_secret: SecretString,
        #[builder(into)] session_key: Option<SecretString>,
        base_url: Option<Url>,
        login_url: Option<Url>,
        timeout: Option<Duration>,
        #[builder(default)] retry: RetryPolicy,
        #[builder(default)] default_headers: Headers,
        dispatch: Option<Dispatch>,
    ) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(API_URL)?,
        };
        let login_url = match login_url {
            Some(url) => url,
            None => Url::parse(LOGIN_URL)?,
        };

        let config = Self {
            base_url: with_trailing_slash(base_url),
            login_url,
            app_key,
            app_secret,
            session_key,
            timeout: effective_timeout(timeout.unwrap_or_default()),
            retry,
            default_headers,
            dispatch,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn from_raw(raw: RawClientConfig) -> Result<Self> {
        let base_url = raw
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| Error::validation(format!("invalid base_url: {e}")))?;
        let login_url = raw
            .login_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| Error::validation(format!("invalid login_url: {e}")))?;

        let mut retry = RetryPolicy::default();
        if let Some(max_attempts) = raw.max_attempts {
            retry = retry.with_max_attempts(max_attempts);
        }
        if let Some(delay_ms) = raw.retry_delay_ms {
            retry = retry.with_delay(Duration::from_millis(delay_ms));
        }

        Self::builder()
            .app_key(raw.app_key)
            .app_secret(raw.app_secret)
            .maybe_session_key(raw.session_key)
            .maybe_base_url(base_url)
            .maybe_login_url(login_url)
            .timeout(Duration::from_secs(raw.timeout_seconds))
            .retry(retry)
            .build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_key.trim().is_empty() {
            return Err(Error::validation("app key cannot be empty"));
        }
        if self.app_secret.expose_secret().is_empty() {
            return Err(Error::validation("app secret cannot be empty"));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "base url `{}` cannot be used as a base",
                self.base_url
            )));
        }

        self.retry.validate()
    }

    /// The URL of `endpoint` under the configured base.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

/// Builds the interactive login URL a user opens to obtain a session key.
pub fn login_url(login_base: &Url, app_key: &str) -> Result<Url> {
    if app_key.trim().is_empty() {
        return Err(Error::validation("app key cannot be empty"));
    }

    let mut url = login_base.clone();
    url.query_pairs_mut().append_pair("api_key", app_key);
    Ok(url)
}

/// Zero means "unset".
fn effective_timeout(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        timeout
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
