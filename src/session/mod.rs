//! Session client and its configuration.
//!
//! The session lifecycle has two phases:
//! - bootstrap: a signed `customerdetails` request carrying the short-lived session key returns
//!   the long-lived session token
//! - authenticated calls: every request is signed and carries the token in `X-SessionToken`
//!
//! There is no logout or token refresh; a new session means a new client.

mod client;
mod config;
mod policy;
mod state;

pub use client::BreezeClient;
pub use config::{ClientConfig, DEFAULT_TIMEOUT, RawClientConfig, login_url};
pub use policy::RetryPolicy;
pub use state::AuthState;
