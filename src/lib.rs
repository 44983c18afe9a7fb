//! # biometric-match-client
//!
//! A Rust client for a biometric image-matching service: upload image files
//! for pairwise comparison and read back match scores, one at a time or the
//! whole stored history.
//!
//! ## Quick Start
//!
//! ```no_run
//! use biometric_match_client::MatchClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MatchClient::builder()
//!         .base_url("http://localhost:8080/biometric")
//!         .build()?;
//!
//!     println!("{}", client.hello("Viki").await?);
//!
//!     let score = client.match_files(&["images/1.png", "images/2.png"]).await?;
//!     println!("{} vs {}: {}", score.file_name1, score.file_name2, score.match_score);
//!
//!     for entry in client.get_all_match_scores().await? {
//!         println!("{}: {}", entry.id, entry.match_score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a service
//!
//! Every call goes through an [`HttpTransport`]. Supply your own with
//! [`MatchClientBuilder::transport`] to inspect outbound requests and return
//! canned responses.
//!
//! ## Debugging
//!
//! Set `LOUD_WIRE=1` to print every request and response to stderr, or call
//! [`dump_request`] on a request you built yourself.

pub mod client;
pub mod errors;
mod http;
pub mod multipart;
pub mod transport;
pub mod types;

pub use client::{MatchClient, MatchClientBuilder};
pub use errors::{BoxError, MatchClientError, UrlParseError};
pub use http::common::{DEFAULT_BASE_URL, Endpoint};
pub use http::response::ResponseShape;
pub use http::wire_log::dump_request;
pub use multipart::{
    EncodedForm, FORM_FIELD_NAME, MultipartForm, PART_CONTENT_TYPE, PartHeader, encode_files,
};
pub use transport::HttpTransport;
pub use types::{BulkScoreEntry, ErrorResponse, MatchScoreResult};
