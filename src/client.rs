use crate::errors::MatchClientError;
use crate::http::common::{DEFAULT_BASE_URL, Endpoint, parse_url};
use crate::http::request::{get_request, upload_request};
use crate::http::response::{ResponseShape, check_response, read_body};
use crate::http::wire_log;
use crate::multipart::encode_files;
use crate::transport::HttpTransport;
use crate::types::{BulkScoreEntry, MatchScoreResult};
use reqwest::{Request, Url};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The main client for the biometric match service.
///
/// Holds the base URL and the transport; both are fixed once built. Cloning
/// is cheap and clones share the transport, so one client can serve many
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct MatchClient {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
}

/// Builder for `MatchClient` instances.
///
/// # Example
///
/// ```
/// use biometric_match_client::MatchClient;
/// use std::time::Duration;
///
/// let client = MatchClient::builder()
///     .base_url("http://matcher.internal:8080/biometric")
///     .timeout(Duration::from_secs(30))
///     .build()
///     .expect("valid configuration");
/// assert_eq!(client.base_url().host_str(), Some("matcher.internal"));
/// ```
#[derive(Debug, Default)]
pub struct MatchClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl MatchClientBuilder {
    /// Sets the service base URL, including the `/biometric` prefix.
    ///
    /// Defaults to `http://localhost:8080/biometric`.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the total request timeout of the built-in transport.
    ///
    /// If not set, uses reqwest's default (no timeout).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout of the built-in transport.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Replaces the built-in `reqwest` transport.
    ///
    /// Timeouts configured on this builder do not apply to a custom
    /// transport.
    #[must_use]
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the `MatchClient`.
    ///
    /// # Errors
    ///
    /// - [`MatchClientError::InvalidUrl`] if the base URL does not parse
    /// - [`MatchClientError::ClientBuild`] if the built-in transport cannot
    ///   be created
    pub fn build(self) -> Result<MatchClient, MatchClientError> {
        let base_url = parse_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let transport = match self.transport {
            Some(transport) => {
                if self.timeout.is_some() || self.connect_timeout.is_some() {
                    tracing::warn!("Timeouts are ignored when a custom transport is supplied");
                }
                transport
            }
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(connect_timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(connect_timeout);
                }
                Arc::new(builder.build().map_err(MatchClientError::ClientBuild)?)
            }
        };

        Ok(MatchClient {
            base_url,
            transport,
        })
    }
}

impl MatchClient {
    /// Creates a new builder for `MatchClient` instances.
    #[must_use]
    pub fn builder() -> MatchClientBuilder {
        MatchClientBuilder::default()
    }

    /// Creates a client for the default base URL using `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClientError::ClientBuild`] if the HTTP client cannot be
    /// created.
    pub fn new() -> Result<Self, MatchClientError> {
        Self::builder().build()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Calls `GET /hello/{name}` and returns the body text unchanged.
    ///
    /// An empty `name` is sent as-is; any default greeting is the service's
    /// choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not `200 OK`, or
    /// the body is not UTF-8. `name` values `.` and `..` are rejected with
    /// [`MatchClientError::InvalidPathSegment`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use biometric_match_client::MatchClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = MatchClient::new()?;
    /// let greeting = client.hello("Viki").await?;
    /// println!("{greeting}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn hello(&self, name: &str) -> Result<String, MatchClientError> {
        let url = Endpoint::Hello { name }.url(&self.base_url)?;
        tracing::debug!("Saying hello: name={name:?}");

        self.fetch(get_request(url)).await
    }

    /// Uploads the images at `paths` to `POST /image/match` and returns
    /// their match score.
    ///
    /// The paths are sent in order, unmodified and without deduplication;
    /// how many images a comparison needs is decided by the service.
    ///
    /// # Errors
    ///
    /// Every failure is a [`MatchClientError::MatchFiles`] wrapping the
    /// stage that failed: opening or reading a file, the transport, the
    /// status check or decoding. Use [`MatchClientError::innermost`] or
    /// [`std::error::Error::source`] to inspect it. No request is sent if
    /// any file fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use biometric_match_client::MatchClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = MatchClient::new()?;
    /// let result = client.match_files(&["images/1.png", "images/2.png"]).await?;
    /// println!("{} vs {}: {}", result.file_name1, result.file_name2, result.match_score);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn match_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<MatchScoreResult, MatchClientError> {
        let wrap = |e| MatchClientError::MatchFiles(Box::new(e));

        let url = Endpoint::MatchImages.url(&self.base_url).map_err(wrap)?;
        self.upload(url, paths).await.map_err(wrap)
    }

    /// Uploads the images at `paths` to an arbitrary `destination` URL and
    /// decodes a match score from the response.
    ///
    /// This is the flow behind [`match_files`](Self::match_files) without the
    /// context wrapper, for services mounted elsewhere.
    ///
    /// # Errors
    ///
    /// [`MatchClientError::InvalidUrl`] if `destination` does not parse,
    /// checked before any file is opened; otherwise the stage error of the
    /// failing step.
    pub async fn upload_files<P: AsRef<Path>>(
        &self,
        destination: &str,
        paths: &[P],
    ) -> Result<MatchScoreResult, MatchClientError> {
        let url = parse_url(destination)?;
        self.upload(url, paths).await
    }

    /// Calls `GET /matchscore/downloadFile/all` and returns every stored
    /// comparison in the order the service sent them.
    ///
    /// An empty list is a successful answer; only the error return signals
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not `200 OK`, or
    /// the body is not a JSON array of score entries.
    pub async fn get_all_match_scores(&self) -> Result<Vec<BulkScoreEntry>, MatchClientError> {
        let url = Endpoint::AllMatchScores.url(&self.base_url)?;
        let scores: Vec<BulkScoreEntry> = self.fetch(get_request(url)).await?;

        tracing::debug!("Retrieved {} match scores", scores.len());

        Ok(scores)
    }

    async fn upload<P: AsRef<Path>>(
        &self,
        url: Url,
        paths: &[P],
    ) -> Result<MatchScoreResult, MatchClientError> {
        let form = encode_files(paths).await?;

        tracing::debug!(
            "Uploading {} files ({} bytes) to {}",
            form.part_count(),
            form.len(),
            url
        );

        let result: MatchScoreResult = self.fetch(upload_request(url, form)?).await?;

        tracing::debug!(
            "Match score received: {} vs {} = {}",
            result.file_name1,
            result.file_name2,
            result.match_score
        );

        Ok(result)
    }

    /// Sends one request and decodes a `200 OK` body into `T`.
    async fn fetch<T: ResponseShape>(&self, request: Request) -> Result<T, MatchClientError> {
        let request_id = wire_log::next_request_id();
        wire_log::log_request(request_id, &request);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| MatchClientError::Transport { source })?;

        wire_log::log_response_status(request_id, response.status());

        let response = check_response(response).await?;
        let body = read_body(response).await?;

        wire_log::log_response_body(request_id, &body);

        T::decode(&body)
    }
}
