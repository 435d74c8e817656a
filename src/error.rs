use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use crate::types::Endpoint;

/// Broad category of an [`Error`].
///
/// Match on this to decide how to react to a failure; use [`Error::downcast_ref`] to get at the
/// typed leaf error when more detail is needed.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq, strum_macros::Display)]
pub enum Kind {
    /// A required request or configuration field was missing or invalid. No network call was made.
    Validation,
    /// The request could not be built, e.g. a malformed URL.
    Construction,
    /// The network round trip failed after all retry attempts were exhausted.
    Transport,
    /// The response arrived but its body could not be read.
    Body,
    /// An authenticated call was attempted before the session was established, or the session
    /// bootstrap could not be started or completed.
    AuthState,
    /// The response body was not valid JSON or did not match the expected shape.
    Decode,
    /// The response envelope decoded correctly but carried a non-null `Error`.
    Business,
    /// Failure inside the client itself, e.g. the HTTP client could not be created.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    backtrace: Backtrace,
    context: Vec<Cow<'static, str>>,
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl Error {
    #[must_use]
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
            context: Vec::new(),
            inner: Box::new(source),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Context frames attached with [`Error::with_context`], innermost first.
    #[must_use]
    pub fn context(&self) -> &[Cow<'static, str>] {
        &self.context
    }

    /// Attaches the operation or target the failure happened in.
    #[must_use]
    pub fn with_context<C: Into<Cow<'static, str>>>(mut self, context: C) -> Self {
        self.context.push(context.into());
        self
    }

    #[must_use]
    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Validation {
            reason: reason.into(),
        }
        .into()
    }

    #[must_use]
    pub fn auth_state<S: Into<String>>(reason: S) -> Self {
        AuthState {
            reason: reason.into(),
        }
        .into()
    }

    #[must_use]
    pub fn business(status: i64, error: serde_json::Value) -> Self {
        Business { status, error }.into()
    }

    #[must_use]
    pub fn unknown_endpoint<S: Into<String>>(path: S) -> Self {
        Self::validation(format!("unknown endpoint `{}`", path.into()))
    }

    pub(crate) fn decode(source: serde_path_to_error::Error<serde_json::Error>, raw: &[u8]) -> Self {
        Self::with_source(Kind::Decode, Decode::new(source, raw))
    }

    pub(crate) fn endpoint_context(self, operation: &str, endpoint: Endpoint) -> Self {
        self.with_context(format!("{operation} `{endpoint}`"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.context.iter().rev() {
            write!(f, "{frame}: ")?;
        }
        write!(f, "{} error: {}", self.kind, self.inner)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref() as &(dyn StdError + 'static))
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AuthState {
    pub reason: String,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl StdError for AuthState {}

impl From<AuthState> for Error {
    fn from(err: AuthState) -> Self {
        Error::with_source(Kind::AuthState, err)
    }
}

/// The API answered with a well-formed envelope whose `Error` field was set.
///
/// The shape of `Error` differs between endpoints (string, object), so it is kept as raw JSON.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub status: i64,
    pub error: serde_json::Value,
}

impl fmt::Display for Business {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            serde_json::Value::String(message) => write!(f, "status {}: {message}", self.status),
            other => write!(f, "status {}: {other}", self.status),
        }
    }
}

impl StdError for Business {}

impl From<Business> for Error {
    fn from(err: Business) -> Self {
        Error::with_source(Kind::Business, err)
    }
}

const RAW_BODY_PREVIEW: usize = 256;

#[derive(Debug)]
pub struct Decode {
    pub path: String,
    pub raw: String,
    source: serde_json::Error,
}

impl Decode {
    fn new(err: serde_path_to_error::Error<serde_json::Error>, raw: &[u8]) -> Self {
        let path = err.path().to_string();
        let raw = String::from_utf8_lossy(raw);
        let mut chars = raw.chars();
        let mut preview: String = chars.by_ref().take(RAW_BODY_PREVIEW).collect();
        if chars.next().is_some() {
            preview.push_str("...");
        }

        Self {
            path,
            raw: preview,
            source: err.into_inner(),
        }
    }
}

impl fmt::Display for Decode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at `{}`: {} (body: {})", self.path, self.source, self.raw)
    }
}

impl StdError for Decode {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(Kind::Construction, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(Kind::Construction, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_renders_outermost_first() {
        let err = Error::validation("url is required")
            .with_context("execute")
            .with_context("get customer details");

        assert_eq!(err.kind(), Kind::Validation);
        assert_eq!(
            err.to_string(),
            "get customer details: execute: Validation error: invalid: url is required"
        );
    }

    #[test]
    fn business_error_keeps_raw_value() {
        let err = Error::business(500, serde_json::json!("Session key is expired"));

        let business = err.downcast_ref::<Business>().expect("business leaf");
        assert_eq!(business.status, 500);
        assert_eq!(business.error, "Session key is expired");
        assert!(err.to_string().ends_with("status 500: Session key is expired"));
    }

    #[test]
    fn decode_error_truncates_body() {
        let raw = format!("{{\"Status\": \"{}\"}}", "x".repeat(1000));
        let source = serde_path_to_error::deserialize::<_, crate::Envelope<()>>(
            &mut serde_json::Deserializer::from_str(&raw),
        )
        .expect_err("status must be numeric");

        let err = Error::decode(source, raw.as_bytes());
        let decode = err.downcast_ref::<Decode>().expect("decode leaf");
        assert_eq!(decode.path, "Status");
        assert!(decode.raw.ends_with("..."));
        assert!(decode.raw.len() < raw.len());
    }
}
