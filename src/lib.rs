//! Client SDK for the ICICI Breeze REST trading API.
//!
//! The crate is built around one pipeline that every call goes through:
//!
//! ```text
//! endpoint method -> BreezeClient::request_with_tokens -> RequestExecutor -> transport stack
//! ```
//!
//! - [`checksum`] signs each body with the app secret and a UTC timestamp.
//! - [`transport`] layers logging, retry and fixed-header injection over a base transport.
//! - [`RequestExecutor`] validates requests and returns raw response bodies.
//! - [`BreezeClient`] owns the credentials and the session lifecycle: a session key obtained from
//!   the interactive login ([`BreezeClient::login_url`]) is exchanged for a session token, which
//!   then authenticates every call.
//!
//! ```no_run
//! use breeze_connect::{BreezeClient, ClientConfig};
//!
//! # async fn run() -> breeze_connect::Result<()> {
//! let config = ClientConfig::builder()
//!     .app_key("app-key")
//!     .app_secret("app-secret")
//!     .session_key("session-key")
//!     .build()?;
//!
//! let client = BreezeClient::connect(config).await?;
//! let funds = client.funds().await?.into_result()?;
//! println!("{}", funds.total_bank_balance);
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod customer;
pub mod envelope;
pub mod error;
pub mod request;
pub mod session;
pub mod transport;
pub mod types;

pub use customer::{CustomerDetails, DematHolding, Funds};
pub use envelope::{Envelope, decode};
pub use error::{Error, Kind};
pub use request::{ApiRequest, RequestExecutor};
pub use session::{AuthState, BreezeClient, ClientConfig, RawClientConfig, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, Transport};
pub use types::{Endpoint, Headers, RequestMethod};

pub type Result<T> = std::result::Result<T, Error>;

/// Base URL of the REST API.
pub const API_URL: &str = "https://api.icicidirect.com/breezeapi/api/v1/";
/// Interactive login page; the app key goes in the `api_key` query parameter.
pub const LOGIN_URL: &str = "https://api.icicidirect.com/apiuser/login";
