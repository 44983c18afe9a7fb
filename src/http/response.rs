//! Response status checks and body decoding.

use crate::errors::MatchClientError;
use crate::types::{BulkScoreEntry, ErrorResponse, MatchScoreResult};
use bytes::Bytes;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Maximum characters to include from a body in error context messages
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

mod sealed {
    pub trait Sealed {}
}

/// A body shape a service call can decode into.
///
/// The set is closed: plain text for the greeting, one
/// [`MatchScoreResult`] for a pairwise match, a list of
/// [`BulkScoreEntry`] for bulk retrieval and [`ErrorResponse`] for
/// non-success bodies. The call site picks the shape; the body is never
/// inspected to guess it.
pub trait ResponseShape: sealed::Sealed + Sized {
    /// Name used in decode error messages.
    const NAME: &'static str;

    /// Decodes a fully drained success body.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClientError::Decode`] (or [`MatchClientError::Utf8`] for
    /// text) when the body does not have this shape.
    fn decode(body: &[u8]) -> Result<Self, MatchClientError>;
}

impl sealed::Sealed for String {}
impl sealed::Sealed for MatchScoreResult {}
impl sealed::Sealed for Vec<BulkScoreEntry> {}
impl sealed::Sealed for ErrorResponse {}

impl ResponseShape for String {
    const NAME: &'static str = "text";

    fn decode(body: &[u8]) -> Result<Self, MatchClientError> {
        Ok(String::from_utf8(body.to_vec())?)
    }
}

impl ResponseShape for MatchScoreResult {
    const NAME: &'static str = "MatchScoreResult";

    fn decode(body: &[u8]) -> Result<Self, MatchClientError> {
        deserialize_with_context(body, Self::NAME)
    }
}

impl ResponseShape for Vec<BulkScoreEntry> {
    const NAME: &'static str = "BulkScoreEntry list";

    fn decode(body: &[u8]) -> Result<Self, MatchClientError> {
        deserialize_with_context(body, Self::NAME)
    }
}

impl ResponseShape for ErrorResponse {
    const NAME: &'static str = "ErrorResponse";

    fn decode(body: &[u8]) -> Result<Self, MatchClientError> {
        deserialize_with_context(body, Self::NAME)
    }
}

/// Deserializes JSON, attaching the shape name and a body preview on failure.
pub(crate) fn deserialize_with_context<T: DeserializeOwned>(
    body: &[u8],
    shape: &'static str,
) -> Result<T, MatchClientError> {
    serde_json::from_slice(body).map_err(|source| MatchClientError::Decode {
        shape,
        preview: truncate_for_context(&String::from_utf8_lossy(body), ERROR_BODY_PREVIEW_LENGTH),
        source,
    })
}

/// Passes a `200 OK` response through and turns anything else into
/// [`MatchClientError::BadStatus`].
///
/// The body of a failed response is drained and parsed as an
/// [`ErrorResponse`] when possible. Failing to read or parse it only loses
/// the extra detail; the status error is always returned.
pub(crate) async fn check_response(response: Response) -> Result<Response, MatchClientError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    tracing::debug!("Service answered with non-success status {status}");

    let error_body = match response.bytes().await {
        Ok(body) if body.is_empty() => None,
        Ok(body) => match ErrorResponse::decode(&body) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Discarding unparseable error body for status {status}: {e}");
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read error body for status {status}: {e}");
            None
        }
    };

    Err(MatchClientError::BadStatus { status, error_body })
}

/// Drains the whole response body.
pub(crate) async fn read_body(response: Response) -> Result<Bytes, MatchClientError> {
    response
        .bytes()
        .await
        .map_err(|source| MatchClientError::ReadBody { source })
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}
