use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::{Error, Kind};

/// The `{Status, Error, Success}` wrapper around every API response.
///
/// `error` is kept as raw JSON: depending on the endpoint it is a string or an object. Only its
/// presence matters; a JSON `null` reads as `None`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "Status")]
    pub status: i64,
    #[serde(rename = "Error")]
    pub error: Option<serde_json::Value>,
    #[serde(rename = "Success")]
    pub success: Option<T>,
}

impl<T> Envelope<T> {
    /// `true` when the API reported no error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The success payload, or a `Business` error if the API reported one.
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(Error::business(self.status, error));
        }

        self.success
            .ok_or_else(|| Error::with_source(Kind::Decode, MissingSuccess(self.status)))
    }
}

#[derive(Debug)]
struct MissingSuccess(i64);

impl std::fmt::Display for MissingSuccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status {}: response has neither `Error` nor `Success`", self.0)
    }
}

impl std::error::Error for MissingSuccess {}

/// Decodes a response body into `T`, reporting the JSON path on failure.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(deserializer).map_err(|e| Error::decode(e, body))
}
