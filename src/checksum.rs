//! Request signing.
//!
//! Every call carries `X-Timestamp` and `X-Checksum` headers. The checksum is the hex SHA-256
//! of `timestamp || body || app_secret`, so the timestamp in the header must be the exact one
//! that went into the digest. [`sign`] returns both from a single clock read.

use chrono::{DateTime, Utc};
use sha2::{Digest as _, Sha256};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// A checksum together with the timestamp it was computed over.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub checksum: String,
    pub timestamp: String,
}

impl Signature {
    /// Value for the `X-Checksum` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("token {}", self.checksum)
    }
}

/// Signs `body` with `secret` using the current UTC time.
#[must_use]
pub fn sign(body: &str, secret: &str) -> Signature {
    sign_at(body, secret, Utc::now())
}

/// Signs `body` with `secret` as of `at`. Sub-second precision is dropped.
#[must_use]
pub fn sign_at(body: &str, secret: &str, at: DateTime<Utc>) -> Signature {
    let timestamp = format_timestamp(at);
    let checksum = checksum(&timestamp, body, secret);

    Signature {
        checksum,
        timestamp,
    }
}

#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn checksum(timestamp: &str, body: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(body.as_bytes());
    hasher.update(secret.as_bytes());

    format!("{:x}", hasher.finalize())
}
