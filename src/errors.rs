use crate::types::ErrorResponse;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by an [`HttpTransport`](crate::HttpTransport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error produced when a URL string cannot be parsed.
pub type UrlParseError = <reqwest::Url as std::str::FromStr>::Err;

/// Defines errors that can occur when talking to the biometric match service.
///
/// Every variant names the stage that failed and keeps the underlying error
/// reachable through [`std::error::Error::source`].
///
/// # Example: Handling a rejected upload
///
/// ```ignore
/// match client.match_files(&["1.png", "2.png"]).await {
///     Ok(result) => println!("score: {}", result.match_score),
///     Err(e) => match e.innermost() {
///         MatchClientError::OpenFile { path, .. } => eprintln!("missing {}", path.display()),
///         MatchClientError::BadStatus { status, .. } => eprintln!("service said {status}"),
///         other => eprintln!("{other}"),
///     },
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MatchClientError {
    #[error("failed to open file to upload: {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to query file info: {path}: {source}")]
    FileInfo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write form part: {path}: {source}")]
    WritePart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The number of bytes copied into a part differs from the size observed
    /// when the file was opened.
    #[error("file size changed while writing: {path} (expected {expected} bytes, wrote {written})")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        written: u64,
    },
    #[error("failed to parse destination url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: UrlParseError,
    },
    #[error("invalid path segment '{0}'")]
    InvalidPathSegment(String),
    #[error("invalid multipart boundary '{0}'")]
    InvalidBoundary(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    /// Failed to build the built-in HTTP transport.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("failed to perform http request: {source}")]
    Transport {
        #[source]
        source: BoxError,
    },
    /// The service answered with anything other than `200 OK`.
    ///
    /// `error_body` holds the service's structured error when the body could
    /// be parsed; it is informational only.
    #[error("bad status: {status}")]
    BadStatus {
        status: StatusCode,
        error_body: Option<ErrorResponse>,
    },
    #[error("error reading body: {source}")]
    ReadBody {
        #[source]
        source: reqwest::Error,
    },
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// A `200 OK` body did not match the JSON shape expected by the call.
    #[error("can not unmarshal {shape} JSON: {source} | Context: {preview}")]
    Decode {
        shape: &'static str,
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to get match score data: {0}")]
    MatchFiles(#[source] Box<MatchClientError>),
}

impl MatchClientError {
    /// Returns the HTTP status code for [`BadStatus`](Self::BadStatus) errors,
    /// looking through context wrappers.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self.innermost() {
            Self::BadStatus { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    /// Strips context wrappers and returns the error of the stage that failed.
    #[must_use]
    pub fn innermost(&self) -> &Self {
        match self {
            Self::MatchFiles(inner) => inner.innermost(),
            other => other,
        }
    }
}
