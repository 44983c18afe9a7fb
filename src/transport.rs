//! The seam between request construction and the network.

use crate::errors::BoxError;
use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends one request and returns one response.
///
/// [`reqwest::Client`] implements this trait and is what
/// [`MatchClient`](crate::MatchClient) uses unless another transport is
/// supplied through [`MatchClientBuilder::transport`](crate::MatchClientBuilder::transport).
/// Test doubles implement it to inspect outbound requests and return canned
/// responses without a network.
///
/// Implementations own any deadline, pooling or TLS behavior; the client
/// performs exactly one `send` per operation and never retries.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use biometric_match_client::{BoxError, HttpTransport};
///
/// #[derive(Debug)]
/// struct Offline;
///
/// #[async_trait]
/// impl HttpTransport for Offline {
///     async fn send(&self, _request: reqwest::Request) -> Result<reqwest::Response, BoxError> {
///         Err("network disabled".into())
///     }
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Sends `request` and resolves once response headers are available.
    async fn send(&self, request: Request) -> Result<Response, BoxError>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn send(&self, request: Request) -> Result<Response, BoxError> {
        Ok(self.execute(request).await?)
    }
}
