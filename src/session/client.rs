use std::sync::Arc;

use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::Result;
use crate::checksum;
use crate::customer::{CustomerDetails, CustomerDetailsRequest, DematHolding, Funds};
use crate::envelope::{Envelope, decode};
use crate::error::Error;
use crate::request::{ApiRequest, RequestExecutor};
use crate::session::config::{self, ClientConfig};
use crate::session::state::{AuthState, SessionCell};
use crate::transport::{self, ReqwestTransport, Transport, in_dispatch};
use crate::types::{Endpoint, Headers, RequestMethod};

const DEFAULT_CONTENT_TYPE: &str = "application/json";
const EMPTY_BODY: &str = "{}";

/// Client for the Breeze trading API.
///
/// A client starts `Unauthenticated`. Supplying a session key and bootstrapping exchanges it for a
/// session token; from then on every call is signed with that token. The client is `Send + Sync`
/// and can be shared behind an [`Arc`]: the bootstrap is serialized by a mutex and the token is
/// immutable once set.
pub struct BreezeClient {
    config: ClientConfig,
    executor: RequestExecutor,
    session: SessionCell,
    bootstrap: Mutex<()>,
}

impl BreezeClient {
    /// Creates a client over HTTPS without bootstrapping, even if the config has a session key.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(base))
    }

    /// Creates a client on top of a custom base transport.
    ///
    /// The header, retry and logging stages are always wrapped around `base`.
    pub fn with_transport(config: ClientConfig, base: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let pipeline = transport::pipeline(
            base,
            config.default_headers.clone(),
            config.retry,
            config.dispatch.clone(),
        );

        Ok(Self {
            executor: RequestExecutor::new(Arc::new(pipeline)),
            session: SessionCell::new(config.session_key.clone()),
            bootstrap: Mutex::new(()),
            config,
        })
    }

    /// Creates a client and, if the config carries a session key, bootstraps the session.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = ReqwestTransport::new(config.timeout)?;
        Self::connect_with_transport(config, Arc::new(base)).await
    }

    /// [`BreezeClient::connect`] with a custom base transport.
    pub async fn connect_with_transport(
        config: ClientConfig,
        base: Arc<dyn Transport>,
    ) -> Result<Self> {
        let client = Self::with_transport(config, base)?;

        if client.session.session_key().is_some() {
            client
                .init_session_token()
                .await
                .map_err(|e| e.with_context("initialize breeze client"))?;
        }

        info!(app_key = %client.app_key(), "breeze client initialized");
        Ok(client)
    }

    /// Stores `session_key` and bootstraps the session with it.
    ///
    /// The key is stored only under the bootstrap lock, and only while the client is not `Ready`.
    pub async fn bootstrap<K: Into<SecretString>>(
        &self,
        session_key: K,
    ) -> Result<Envelope<CustomerDetails>> {
        let session_key = session_key.into();
        if session_key.expose_secret().is_empty() {
            return Err(Error::auth_state("session key cannot be empty"));
        }

        in_dispatch(
            self.config.dispatch.as_ref(),
            self.exchange_session_key(Some(session_key)),
        )
        .await
    }

    /// Exchanges the stored session key for a session token.
    ///
    /// On any failure (network, decode, an `Error` in the response, an empty token) the client
    /// stays `Unauthenticated` with no token.
    pub async fn init_session_token(&self) -> Result<Envelope<CustomerDetails>> {
        in_dispatch(self.config.dispatch.as_ref(), self.exchange_session_key(None)).await
    }

    async fn exchange_session_key(
        &self,
        new_key: Option<SecretString>,
    ) -> Result<Envelope<CustomerDetails>> {
        let _bootstrap = self.bootstrap.lock().await;

        if self.session.state() == AuthState::Ready {
            return Err(Error::auth_state("session is already established"));
        }
        if let Some(key) = new_key {
            self.session.set_session_key(key);
        }
        let session_key = self
            .session
            .session_key()
            .ok_or_else(|| Error::auth_state("session key cannot be empty"))?;

        let transition = self.session.begin();
        let envelope = self
            .fetch_customer_details(&session_key)
            .await
            .map_err(|e| e.endpoint_context("bootstrap session via", Endpoint::CustomerDetails))?;

        if let Some(error) = envelope.error.clone() {
            warn!(status = envelope.status, %error, "session bootstrap rejected");
            return Err(Error::business(envelope.status, error).with_context("bootstrap session"));
        }
        let token = envelope
            .success
            .as_ref()
            .map(|details| details.session_token.clone())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::auth_state("bootstrap response carried no session token"))?;

        transition.complete(SecretString::from(token));
        info!(app_key = %self.app_key(), "session established");

        Ok(envelope)
    }

    /// Signed header set for `body`.
    ///
    /// The `X-Timestamp` value is the one the checksum was computed over. Before bootstrap the
    /// `X-SessionToken` header is empty.
    #[must_use]
    pub fn generate_headers(&self, body: &str, content_type: Option<&str>) -> Headers {
        let signature = checksum::sign(body, self.config.app_secret.expose_secret());
        let token = self.session.token();

        let mut headers = Headers::new();
        headers.insert("Connection", "keep-alive");
        headers.insert("X-Checksum", signature.header_value());
        headers.insert("X-Timestamp", signature.timestamp);
        headers.insert("Content-Type", content_type.unwrap_or(DEFAULT_CONTENT_TYPE));
        headers.insert("X-AppKey", self.config.app_key.as_str());
        headers.insert(
            "X-SessionToken",
            token.as_ref().map_or("", |token| token.expose_secret()),
        );
        headers
    }

    /// Sends an authenticated request and returns the raw response body.
    ///
    /// `payload` is serialized to JSON (`{}` when absent) and signed. `headers` are merged over
    /// the generated ones, so a caller-supplied `Content-Type` wins. Fails with `AuthState`
    /// without sending anything unless the client is `Ready`.
    pub async fn request_with_tokens<P: Serialize + ?Sized>(
        &self,
        method: RequestMethod,
        endpoint: Endpoint,
        payload: Option<&P>,
        headers: Option<&Headers>,
    ) -> Result<Vec<u8>> {
        in_dispatch(
            self.config.dispatch.as_ref(),
            self.send_authenticated(method, endpoint, payload, headers),
        )
        .await
        .map_err(|e| e.endpoint_context(&method.to_string(), endpoint))
    }

    async fn send_authenticated<P: Serialize + ?Sized>(
        &self,
        method: RequestMethod,
        endpoint: Endpoint,
        payload: Option<&P>,
        headers: Option<&Headers>,
    ) -> Result<Vec<u8>> {
        if self.session.state() != AuthState::Ready {
            return Err(Error::auth_state(
                "session token not initialized; bootstrap the session first",
            ));
        }

        let body = match payload {
            Some(payload) => serde_json::to_string(payload)?,
            None => EMPTY_BODY.to_owned(),
        };

        let mut request_headers = self.generate_headers(&body, None);
        if let Some(headers) = headers {
            request_headers.merge(headers);
        }

        let url = self.endpoint_url(endpoint)?;
        info!(%method, %url, "authenticated request");

        let request = ApiRequest::builder()
            .method(method)
            .url(url)
            .body(body)
            .headers(request_headers)
            .build();

        self.executor.execute(request).await
    }

    /// Authenticated request decoded into the response envelope.
    pub async fn call<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        method: RequestMethod,
        endpoint: Endpoint,
        payload: Option<&P>,
    ) -> Result<Envelope<T>> {
        let body = self
            .request_with_tokens(method, endpoint, payload, None)
            .await?;

        decode(&body).map_err(|e| e.endpoint_context("decode", endpoint))
    }

    /// Fetches customer details using the session key.
    ///
    /// This is the request the session bootstrap is built on; it works before the client is
    /// `Ready`, as long as a session key has been supplied.
    pub async fn customer_details(&self) -> Result<Envelope<CustomerDetails>> {
        let session_key = self
            .session
            .session_key()
            .ok_or_else(|| Error::auth_state("session key is required to fetch customer details"))?;

        self.fetch_customer_details(&session_key)
            .await
            .map_err(|e| e.endpoint_context("get", Endpoint::CustomerDetails))
    }

    async fn fetch_customer_details(
        &self,
        session_key: &SecretString,
    ) -> Result<Envelope<CustomerDetails>> {
        let body = serde_json::to_string(&CustomerDetailsRequest {
            session_key: session_key.expose_secret(),
            app_key: self.app_key(),
        })?;

        let request = ApiRequest::builder()
            .method(RequestMethod::Get)
            .url(self.endpoint_url(Endpoint::CustomerDetails)?)
            .headers(self.generate_headers(&body, None))
            .body(body)
            .build();

        let response = self.executor.execute(request).await?;
        decode(&response)
    }

    pub async fn demat_holdings(&self) -> Result<Envelope<Vec<DematHolding>>> {
        self.call(RequestMethod::Get, Endpoint::DematHoldings, None::<&()>)
            .await
    }

    pub async fn funds(&self) -> Result<Envelope<Funds>> {
        self.call(RequestMethod::Get, Endpoint::Funds, None::<&()>)
            .await
    }

    /// URL of the interactive login page for this app key.
    pub fn login_url(&self) -> Result<Url> {
        config::login_url(&self.config.login_url, &self.config.app_key)
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.session.state()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.auth_state() == AuthState::Ready
    }

    /// The session token, once the session is `Ready`.
    #[must_use]
    pub fn session_token(&self) -> Option<SecretString> {
        self.session.token()
    }

    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.config.app_key
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<String> {
        Ok(self.config.endpoint_url(endpoint.as_str())?.into())
    }
}

impl std::fmt::Debug for BreezeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreezeClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("app_key", &self.config.app_key)
            .field("state", &self.session.state())
            .finish_non_exhaustive()
    }
}
